//! Budget Breaker: a global cancellation signal between batches.
//!
//! Fails open on a DB error — a transient spend-query failure should not
//! block legitimate benchmark work — but the condition is logged so the
//! fail-open path is visible in operations.

use sqlx::PgPool;

const SPEND_WINDOW_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetStatus {
    pub current_spend: f64,
    pub budget_cap: f64,
    pub remaining: f64,
    pub percent_used: f64,
    pub should_abort: bool,
}

impl BudgetStatus {
    pub fn status_line(&self) -> String {
        format!(
            "spend ${:.4} / cap ${:.2} ({:.1}% used, {})",
            self.current_spend,
            self.budget_cap,
            self.percent_used,
            if self.should_abort { "ABORT" } else { "ok" }
        )
    }
}

/// Consulted before dispatching a batch and before starting a full run.
pub async fn check_budget(pool: &PgPool, budget_cap: f64) -> BudgetStatus {
    match llmb_db::get_recent_spending(pool, SPEND_WINDOW_HOURS).await {
        Ok(current_spend) => {
            let remaining = (budget_cap - current_spend).max(0.0);
            let percent_used = if budget_cap > 0.0 { (current_spend / budget_cap) * 100.0 } else { 100.0 };
            BudgetStatus {
                current_spend,
                budget_cap,
                remaining,
                percent_used,
                should_abort: current_spend >= budget_cap,
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "budget spend query failed, failing open");
            BudgetStatus {
                current_spend: 0.0,
                budget_cap,
                remaining: budget_cap,
                percent_used: 0.0,
                should_abort: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_reports_abort_when_over_cap() {
        let status = BudgetStatus {
            current_spend: 20.0,
            budget_cap: 15.0,
            remaining: 0.0,
            percent_used: 133.3,
            should_abort: true,
        };
        assert!(status.status_line().contains("ABORT"));
    }

    #[test]
    fn status_line_reports_ok_under_cap() {
        let status = BudgetStatus {
            current_spend: 1.0,
            budget_cap: 15.0,
            remaining: 14.0,
            percent_used: 6.7,
            should_abort: false,
        };
        assert!(status.status_line().contains("ok"));
    }
}
