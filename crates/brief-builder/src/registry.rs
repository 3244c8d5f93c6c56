//! Program registry and the per-program adapter interface.

use brief_core::{
    async_trait, ContentStore, Program, RawSolicitation, Solicitation, SolicitationFilter,
    StoreError,
};

/// Per-program access to solicitation data.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Short program code, e.g. `tls`.
    fn code(&self) -> &'static str;

    /// Display name, e.g. `DLA Tailored Logistics Support`.
    fn name(&self) -> &'static str;

    /// Search keywords for the program.
    fn keywords(&self) -> &'static [&'static str];

    /// Read raw solicitation rows for this program.
    async fn fetch_solicitations(
        &self,
        store: &dyn ContentStore,
        filter: SolicitationFilter,
    ) -> Result<Vec<RawSolicitation>, StoreError> {
        store.solicitations(self.code(), filter).await
    }

    /// Map a raw row into the common shape.
    fn normalize(&self, raw: RawSolicitation) -> Solicitation;

    /// The program record for this adapter.
    fn program(&self) -> Program {
        Program {
            code: self.code().to_string(),
            name: self.name().to_string(),
            keywords: self.keywords().iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// The set of active programs, in registration order.
#[derive(Default)]
pub struct ProgramRegistry {
    adapters: Vec<Box<dyn Adapter>>,
}

impl ProgramRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in programs: TLS, OASIS+ and SEWP.
    pub fn standard() -> Self {
        Self::new()
            .register(crate::TlsAdapter)
            .register(crate::OasisAdapter)
            .register(crate::SewpAdapter)
    }

    /// Add an adapter. A later adapter with the same code replaces the earlier one.
    pub fn register(mut self, adapter: impl Adapter + 'static) -> Self {
        self.adapters.retain(|a| a.code() != adapter.code());
        self.adapters.push(Box::new(adapter));
        self
    }

    /// Keep only the listed program codes.
    pub fn retain_codes(mut self, codes: &[&str]) -> Self {
        self.adapters.retain(|a| codes.contains(&a.code()));
        self
    }

    /// `{code, name, keywords}` for each active program.
    pub fn active_programs(&self) -> Vec<Program> {
        self.adapters.iter().map(|a| a.program()).collect()
    }

    /// Resolve an adapter by program code.
    pub fn adapter(&self, code: &str) -> Option<&dyn Adapter> {
        self.adapters
            .iter()
            .find(|a| a.code() == code)
            .map(|a| a.as_ref())
    }

    /// Iterate adapters in registration order.
    pub fn adapters(&self) -> impl Iterator<Item = &dyn Adapter> {
        self.adapters.iter().map(|a| a.as_ref())
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_order() {
        let registry = ProgramRegistry::standard();
        let codes: Vec<String> = registry.active_programs().into_iter().map(|p| p.code).collect();
        assert_eq!(codes, vec!["tls", "oasis", "sewp"]);
    }

    #[test]
    fn test_adapter_lookup() {
        let registry = ProgramRegistry::standard();
        assert_eq!(registry.adapter("oasis").map(|a| a.name()), Some("GSA OASIS+"));
        assert!(registry.adapter("cio-sp4").is_none());
    }

    #[test]
    fn test_register_replaces_same_code() {
        let registry = ProgramRegistry::standard().register(crate::TlsAdapter);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.active_programs().last().map(|p| p.code.as_str()), Some("tls"));
    }

    #[test]
    fn test_retain_codes() {
        let registry = ProgramRegistry::standard().retain_codes(&["sewp"]);
        assert_eq!(registry.len(), 1);
        assert!(registry.adapter("sewp").is_some());
    }
}
