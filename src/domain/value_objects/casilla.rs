//! Boxes (casillas) touched by recalculation
//!
//! Every box lives in the `liquidacion` section of the data tree under a fixed
//! key. Baselines used to make recalculation idempotent live beside them.

use std::fmt;

/// Section that holds every settlement box
pub const LIQUIDACION: &str = "liquidacion";

/// Baseline of box 13 before any reduction was applied
pub const BASE_REAL_BASELINE: &str = "liquidacionBaseLiquidableAntesReducciones";

/// Baseline of box 14 before any reduction was applied
pub const BASE_TEORICA_BASELINE: &str = "liquidacionBaseLiquidableTeoricaAntesReducciones";

/// Object holding the dependent boxes before proportional adjustment
pub const DEPENDENT_BASELINE: &str = "casillasAntesReducciones";

/// A settlement box of the model 650 layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Casilla {
    /// 13: base liquidable real
    BaseReal,
    /// 14: base liquidable teórica
    BaseTeorica,
    /// 16: cuota íntegra
    CuotaIntegra,
    /// 605: cuota tributaria
    CuotaTributaria,
    /// 606: reducción por exceso de cuota
    ReduccionExcesoCuota,
    /// 607: cuota tributaria ajustada
    CuotaTributariaAjustada,
}

impl Casilla {
    /// Boxes scaled by the proportional adjustment factor
    pub const DEPENDENT: [Casilla; 4] = [
        Casilla::CuotaTributaria,
        Casilla::ReduccionExcesoCuota,
        Casilla::CuotaTributariaAjustada,
        Casilla::CuotaIntegra,
    ];

    /// Printed box number
    pub fn number(self) -> &'static str {
        match self {
            Casilla::BaseReal => "13",
            Casilla::BaseTeorica => "14",
            Casilla::CuotaIntegra => "16",
            Casilla::CuotaTributaria => "605",
            Casilla::ReduccionExcesoCuota => "606",
            Casilla::CuotaTributariaAjustada => "607",
        }
    }

    /// Key of the box inside the `liquidacion` section
    pub fn key(self) -> &'static str {
        match self {
            Casilla::BaseReal => "liquidacionBaseLiquidableRealCaja13",
            Casilla::BaseTeorica => "liquidacionBaseLiquidableTeoricaCaja14",
            Casilla::CuotaIntegra => "liquidacionCuotaIntegraCaja16",
            Casilla::CuotaTributaria => "liquidacionCuotaTributariaCaja605",
            Casilla::ReduccionExcesoCuota => "liquidacionReduccionExcesoCuotaCaja606",
            Casilla::CuotaTributariaAjustada => "liquidacionCuotaTributariaAjustadaCaja607",
        }
    }

    /// Key of the stored pre-reduction value of a base box
    pub fn baseline_key(self) -> Option<&'static str> {
        match self {
            Casilla::BaseReal => Some(BASE_REAL_BASELINE),
            Casilla::BaseTeorica => Some(BASE_TEORICA_BASELINE),
            _ => None,
        }
    }
}

impl fmt::Display for Casilla {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_end_with_their_box_number() {
        for casilla in [
            Casilla::BaseReal,
            Casilla::BaseTeorica,
            Casilla::CuotaIntegra,
            Casilla::CuotaTributaria,
            Casilla::ReduccionExcesoCuota,
            Casilla::CuotaTributariaAjustada,
        ] {
            assert!(casilla.key().ends_with(casilla.number()), "{casilla}");
        }
    }

    #[test]
    fn only_bases_have_baselines() {
        assert_eq!(Casilla::BaseReal.baseline_key(), Some(BASE_REAL_BASELINE));
        assert!(Casilla::DEPENDENT
            .iter()
            .all(|c| c.baseline_key().is_none()));
    }
}
