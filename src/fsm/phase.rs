use std::fmt;

/// Flight phase, advanced only by particle-cloud consensus with
/// hysteresis — never by a single raw sensor threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Preflight,
    Armed,
    Flight,
    Recovery,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Preflight => "PREFLIGHT",
            Phase::Armed => "ARMED",
            Phase::Flight => "FLIGHT",
            Phase::Recovery => "RECOVERY",
        };
        write!(f, "{name}")
    }
}
