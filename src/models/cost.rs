use serde::Deserialize;

/// One row of `ccusage daily -j` / `ccusage monthly -j`.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CostRow {
    #[serde(default)]
    pub total_cost: Option<f64>,
}

/// Today's spend, the month's spend and the earlier days used for the
/// comparison against average.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostSnapshot {
    pub daily_cost: Option<f64>,
    pub monthly_cost: Option<f64>,
    /// Prior days' totals, oldest first. Today is not included.
    pub history: Vec<f64>,
}

impl CostSnapshot {
    /// Split daily rows (oldest first) into today's cost and the prior days.
    pub fn from_daily_rows(rows: &[CostRow]) -> Self {
        let Some((today, earlier)) = rows.split_last() else {
            return Self::default();
        };
        CostSnapshot {
            daily_cost: today.total_cost.filter(|c| c.is_finite()),
            monthly_cost: None,
            history: earlier
                .iter()
                .map(|r| r.total_cost.filter(|c| c.is_finite()).unwrap_or(0.0))
                .collect(),
        }
    }
}
