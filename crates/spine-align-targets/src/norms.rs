//! Normative reference data.
//!
//! Age buckets and severity breakpoints follow the Schwab-SRS classification
//! with the Lafage age adjustments. The numbers are external clinical
//! reference values; change them only together with [`NormativeTable::version`].

use serde::Serialize;

/// Patient age bucket, strict lower-inclusive breakpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBucket {
    Under45,
    From45To54,
    From55To64,
    From65To74,
    From75,
}

impl AgeBucket {
    pub const ALL: [AgeBucket; 5] = [
        AgeBucket::Under45,
        AgeBucket::From45To54,
        AgeBucket::From55To64,
        AgeBucket::From65To74,
        AgeBucket::From75,
    ];

    /// Bucket for `age` in years.
    ///
    /// There is no failure case: `NaN` and negative ages land in the lowest
    /// bucket, anything from 75 upward in the last one.
    pub fn from_age(age: f64) -> Self {
        let [b45, b55, b65, b75] = NORMS.age_breakpoints;
        if age.is_nan() || age < b45 {
            AgeBucket::Under45
        } else if age < b55 {
            AgeBucket::From45To54
        } else if age < b65 {
            AgeBucket::From55To64
        } else if age < b75 {
            AgeBucket::From65To74
        } else {
            AgeBucket::From75
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeBucket::Under45 => "<45",
            AgeBucket::From45To54 => "45-54",
            AgeBucket::From55To64 => "55-64",
            AgeBucket::From65To74 => "65-74",
            AgeBucket::From75 => ">=75",
        }
    }

    /// Age-adjusted targets of this bucket.
    #[inline]
    pub fn norms(self) -> AgeNorms {
        NORMS.by_age[self.index()]
    }
}

/// Per-bucket targets. Offsets in mm, angles in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AgeNorms {
    pub target_sva_mm: f64,
    pub target_pt_deg: f64,
    pub target_pi_ll_deg: f64,
    pub target_csva_mm: f64,
}

/// `value < mild → Mild`, `< moderate → Moderate`, else `Severe`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ExcessBreakpoints {
    pub mild: f64,
    pub moderate: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CervicalNorms {
    /// `target CL = -(T1S - cl_t1s_offset)`.
    pub cl_t1s_offset_deg: f64,
    /// T1S used for the CL target while T1S is still pending.
    pub t1s_fallback_deg: f64,
    /// CL within this distance of its target reads "Within target".
    pub cl_tolerance_deg: f64,
    /// `|CL - target| < [0] Normal, < [1] Mild, < [2] Moderate`.
    pub cl_deviation: [f64; 3],
    /// `cSVA < [0] Normal, < [1] Mild, < [2] Moderate`.
    pub csva_abs_mm: [f64; 3],
    /// From this age the `[0]..[1]` cSVA band is graded Normal.
    pub csva_elderly_age: f64,
    pub t1s_cl_corridor_deg: (f64, f64),
    pub t1s_cl_target_deg: f64,
    pub t1s_cl_outside: ExcessBreakpoints,
    /// Neutral gaze is `|CBVA| <= cbva_abs[0]`; `<= [1] Mild, <= [2] Moderate`.
    pub cbva_abs_deg: [f64; 3],
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LumbarNorms {
    pub sva_excess: ExcessBreakpoints,
    pub pi_ll_excess: ExcessBreakpoints,
    pub pt_excess: ExcessBreakpoints,
}

/// The complete normative table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct NormativeTable {
    pub version: &'static str,
    /// Lower bounds of buckets 2..=5.
    pub age_breakpoints: [f64; 4],
    pub by_age: [AgeNorms; 5],
    pub cervical: CervicalNorms,
    pub lumbar: LumbarNorms,
}

const fn age(sva: f64, pt: f64, pi_ll: f64, csva: f64) -> AgeNorms {
    AgeNorms {
        target_sva_mm: sva,
        target_pt_deg: pt,
        target_pi_ll_deg: pi_ll,
        target_csva_mm: csva,
    }
}

pub const NORMS: NormativeTable = NormativeTable {
    version: "schwab-srs-lafage-2017.1",
    age_breakpoints: [45.0, 55.0, 65.0, 75.0],
    by_age: [
        age(25.0, 12.0, 0.0, 17.0),
        age(30.0, 15.0, 5.0, 20.0),
        age(40.0, 20.0, 10.0, 25.0),
        age(50.0, 22.0, 12.0, 30.0),
        age(60.0, 25.0, 15.0, 35.0),
    ],
    cervical: CervicalNorms {
        cl_t1s_offset_deg: 16.5,
        t1s_fallback_deg: 25.0,
        cl_tolerance_deg: 3.0,
        cl_deviation: [5.0, 15.0, 25.0],
        csva_abs_mm: [20.0, 40.0, 60.0],
        csva_elderly_age: 65.0,
        t1s_cl_corridor_deg: (16.0, 26.0),
        t1s_cl_target_deg: 21.0,
        t1s_cl_outside: ExcessBreakpoints {
            mild: 8.0,
            moderate: 15.0,
        },
        cbva_abs_deg: [10.0, 17.0, 25.0],
    },
    lumbar: LumbarNorms {
        sva_excess: ExcessBreakpoints {
            mild: 25.0,
            moderate: 60.0,
        },
        pi_ll_excess: ExcessBreakpoints {
            mild: 10.0,
            moderate: 20.0,
        },
        pt_excess: ExcessBreakpoints {
            mild: 8.0,
            moderate: 15.0,
        },
    },
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_breakpoints_are_lower_inclusive() {
        assert_eq!(AgeBucket::from_age(44.9), AgeBucket::Under45);
        assert_eq!(AgeBucket::from_age(45.0), AgeBucket::From45To54);
        assert_eq!(AgeBucket::from_age(54.999), AgeBucket::From45To54);
        assert_eq!(AgeBucket::from_age(55.0), AgeBucket::From55To64);
        assert_eq!(AgeBucket::from_age(65.0), AgeBucket::From65To74);
        assert_eq!(AgeBucket::from_age(75.0), AgeBucket::From75);
        assert_eq!(AgeBucket::from_age(120.0), AgeBucket::From75);
    }

    #[test]
    fn out_of_range_ages_use_boundary_buckets() {
        assert_eq!(AgeBucket::from_age(-3.0), AgeBucket::Under45);
        assert_eq!(AgeBucket::from_age(f64::NAN), AgeBucket::Under45);
        assert_eq!(AgeBucket::from_age(f64::INFINITY), AgeBucket::From75);
    }

    #[test]
    fn table_rows_match_reference_values() {
        let rows: Vec<_> = AgeBucket::ALL
            .iter()
            .map(|b| {
                let n = b.norms();
                (
                    n.target_sva_mm,
                    n.target_pt_deg,
                    n.target_pi_ll_deg,
                    n.target_csva_mm,
                )
            })
            .collect();
        assert_eq!(
            rows,
            vec![
                (25.0, 12.0, 0.0, 17.0),
                (30.0, 15.0, 5.0, 20.0),
                (40.0, 20.0, 10.0, 25.0),
                (50.0, 22.0, 12.0, 30.0),
                (60.0, 25.0, 15.0, 35.0),
            ]
        );
    }

    #[test]
    fn targets_relax_with_age() {
        for pair in NORMS.by_age.windows(2) {
            assert!(pair[0].target_sva_mm < pair[1].target_sva_mm);
            assert!(pair[0].target_pt_deg < pair[1].target_pt_deg);
            assert!(pair[0].target_pi_ll_deg < pair[1].target_pi_ll_deg);
            assert!(pair[0].target_csva_mm < pair[1].target_csva_mm);
        }
    }
}
