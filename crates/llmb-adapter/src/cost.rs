use llmb_schemas::PriceRate;

/// `cost_usd = input/1e6 * rate.input + output/1e6 * rate.output`.
pub fn compute_cost(input_tokens: i64, output_tokens: i64, rate: PriceRate) -> f64 {
    (input_tokens as f64 / 1_000_000.0) * rate.input_per_m
        + (output_tokens as f64 / 1_000_000.0) * rate.output_per_m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_worked_example_from_scenario_1() {
        let rate = PriceRate { input_per_m: 0.15, output_per_m: 0.60 };
        let cost = compute_cost(500, 3, rate);
        assert!((cost - 0.0000768).abs() < 1e-9, "cost was {cost}");
    }

    #[test]
    fn zero_tokens_yields_zero_cost() {
        let rate = PriceRate { input_per_m: 1.0, output_per_m: 1.0 };
        assert_eq!(compute_cost(0, 0, rate), 0.0);
    }
}
