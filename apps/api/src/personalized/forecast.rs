/// The only role the salary forecast (ARIMA) panel has been trained for.
const FORECAST_ROLE: &str = "Data Scientist";

/// Whether the forecast panel should be shown for a user with these
/// interested roles. Exact, case-sensitive match.
pub fn should_show_forecast(interested_roles: &[String]) -> bool {
    interested_roles.iter().any(|r| r == FORECAST_ROLE)
}
