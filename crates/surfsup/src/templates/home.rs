use maud::{html, Markup, DOCTYPE};

/// Documented API routes as `(path, description)`.
pub const ROUTES: &[(&str, &str)] = &[
    (
        "/api/v1.0/precipitation",
        "Returns the last 12 months of precipitation data",
    ),
    ("/api/v1.0/stations", "Returns a list of the weather stations"),
    (
        "/api/v1.0/tobs",
        "Returns the last 12 months of temperature data for the most active weather station",
    ),
    (
        "/api/v1.0/YYYY-MM-DD",
        "Returns the minimum, maximum and average temperature for the time period starting with the given date",
    ),
    (
        "/api/v1.0/YYYY-MM-DD/YYYY-MM-DD",
        "Returns the minimum, maximum and average temperature for the time period specified by the start and end dates",
    ),
];

pub fn home_page(remote_url: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                title { "Hawaii Weather API" }
            }
            body {
                "Welcome to the Hawaii Weather API!" br;
                "Available Routes:" br;
                @for (path, description) in ROUTES {
                    b { (remote_url) (path) } " " (description) br;
                }
                "API documentation: "
                a href={ (remote_url) "/docs" } { (remote_url) "/docs" }
            }
        }
    }
}
