//! Concrete adapters for the supported contract vehicles.

use brief_core::{async_trait, RawSolicitation, Solicitation};

use crate::registry::Adapter;

/// Fallbacks applied when a raw row is missing fields.
struct Defaults {
    agency: &'static str,
    url: &'static str,
}

fn normalize_with(raw: RawSolicitation, defaults: &Defaults) -> Solicitation {
    let agency = raw
        .agency
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| defaults.agency.to_string());

    let status = raw
        .status
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "OPEN".to_string());

    let url = raw
        .url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| defaults.url.to_string());

    Solicitation {
        opp_no: raw.opp_no.trim().to_string(),
        title: raw.title.trim().to_string(),
        agency,
        status,
        close_date: raw.close_date,
        url,
        program_code: raw.program_code,
    }
}

/// DLA Tailored Logistics Support.
#[derive(Debug, Clone, Copy, Default)]
pub struct TlsAdapter;

impl TlsAdapter {
    const DEFAULTS: Defaults = Defaults {
        agency: "Defense Logistics Agency",
        url: "https://www.dla.mil/Troop-Support/",
    };
}

#[async_trait]
impl Adapter for TlsAdapter {
    fn code(&self) -> &'static str {
        "tls"
    }

    fn name(&self) -> &'static str {
        "DLA Tailored Logistics Support"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["tailored logistics support", "tls", "dla troop support", "spe8e"]
    }

    // DLA solicitation numbers are conventionally upper-case (SPE8E...).
    fn normalize(&self, raw: RawSolicitation) -> Solicitation {
        let mut solicitation = normalize_with(raw, &Self::DEFAULTS);
        solicitation.opp_no = solicitation.opp_no.to_uppercase();
        solicitation
    }
}

/// GSA OASIS+.
#[derive(Debug, Clone, Copy, Default)]
pub struct OasisAdapter;

impl OasisAdapter {
    const DEFAULTS: Defaults = Defaults {
        agency: "General Services Administration",
        url: "https://www.gsa.gov/oasis-plus",
    };
}

#[async_trait]
impl Adapter for OasisAdapter {
    fn code(&self) -> &'static str {
        "oasis"
    }

    fn name(&self) -> &'static str {
        "GSA OASIS+"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["oasis+", "oasis plus", "professional services", "on-ramp"]
    }

    fn normalize(&self, raw: RawSolicitation) -> Solicitation {
        normalize_with(raw, &Self::DEFAULTS)
    }
}

/// NASA SEWP V.
#[derive(Debug, Clone, Copy, Default)]
pub struct SewpAdapter;

impl SewpAdapter {
    const DEFAULTS: Defaults = Defaults {
        agency: "NASA",
        url: "https://www.sewp.nasa.gov/",
    };
}

#[async_trait]
impl Adapter for SewpAdapter {
    fn code(&self) -> &'static str {
        "sewp"
    }

    fn name(&self) -> &'static str {
        "NASA SEWP V"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["sewp", "solutions for enterprise-wide procurement", "it products"]
    }

    fn normalize(&self, raw: RawSolicitation) -> Solicitation {
        normalize_with(raw, &Self::DEFAULTS)
    }
}
