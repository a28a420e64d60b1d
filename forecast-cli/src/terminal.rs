//! Plain-text rendering of a [`DashboardView`].

use forecast_core::{DashboardView, Section, TextRegion};
use std::fmt::Write;

/// The whole dashboard as it should appear on screen right now.
pub fn dashboard(view: &DashboardView) -> String {
    let mut out = String::new();

    if view.is_visible(Section::Loading) {
        out.push_str("Loading...\n");
    }
    if view.is_visible(Section::Error) {
        let _ = writeln!(out, "! {}", view.text(TextRegion::ErrorMessage));
    }

    if view.is_visible(Section::CurrentWeather) && !view.text(TextRegion::CurrentTemp).is_empty() {
        current(view, &mut out);
    }
    if view.is_visible(Section::HourlyForecast) && !view.hourly_cards().is_empty() {
        hourly(view, &mut out);
    }
    if view.is_visible(Section::DailyForecast) && !view.daily_cards().is_empty() {
        daily(view, &mut out);
    }

    out
}

fn current(view: &DashboardView, out: &mut String) {
    let icon = view.current_icon().map(|i| i.name).unwrap_or("-");

    let _ = writeln!(
        out,
        "\n{}  ({})",
        view.text(TextRegion::LocationName),
        view.text(TextRegion::LocationCountry)
    );
    let _ = writeln!(out, "{}", view.text(TextRegion::CurrentDate));
    let _ = writeln!(
        out,
        "{}°C  {}  [{icon}]",
        view.text(TextRegion::CurrentTemp),
        view.text(TextRegion::CurrentCondition)
    );
    let _ = writeln!(
        out,
        "Feels like {}  Humidity {}  Wind {}",
        view.text(TextRegion::FeelsLike),
        view.text(TextRegion::Humidity),
        view.text(TextRegion::WindSpeed)
    );
}

fn hourly(view: &DashboardView, out: &mut String) {
    out.push_str("\nNext hours\n");
    for card in view.hourly_cards() {
        let _ = writeln!(
            out,
            "  {:>8}  {:>5}  {:>4}  {:<12}  {}",
            card.time, card.temperature, card.humidity, card.wind, card.icon.alt
        );
    }
}

fn daily(view: &DashboardView, out: &mut String) {
    out.push_str("\nThis week\n");
    for card in view.daily_cards() {
        let _ = writeln!(
            out,
            "  {:<3} {:<6}  {:>4} / {:<4}  rain {:>6}  UV {:>2}  {}",
            card.weekday, card.date, card.temp_max, card.temp_min, card.rain, card.uv, card.condition
        );
    }
}

/// The suggestion dropdown, numbered for `#N`.
pub fn suggestions(view: &DashboardView) -> String {
    if !view.is_visible(Section::SearchResults) {
        return String::new();
    }

    let mut out = String::new();
    for (idx, item) in view.search_results().iter().enumerate() {
        let _ = writeln!(out, "  #{}  {}  {}", idx + 1, item.name, item.detail);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast_core::DisplaySurface;
    use forecast_core::display::{HourlyCard, Icon, SearchResultItem};
    use forecast_core::Location;

    #[test]
    fn loading_and_error_are_shown_first() {
        let mut view = DashboardView::new();
        view.set_visible(Section::Loading, true);
        view.set_text(TextRegion::ErrorMessage, "No locations found.");
        view.set_visible(Section::Error, true);

        let text = dashboard(&view);
        assert!(text.starts_with("Loading...\n! No locations found.\n"));
    }

    #[test]
    fn empty_view_prints_nothing() {
        assert_eq!(dashboard(&DashboardView::new()), "");
    }

    #[test]
    fn current_block_uses_region_text() {
        let mut view = DashboardView::new();
        view.set_text(TextRegion::LocationName, "Kathmandu");
        view.set_text(TextRegion::LocationCountry, "Nepal • Asia/Kathmandu");
        view.set_text(TextRegion::CurrentTemp, "25");
        view.set_text(TextRegion::CurrentCondition, "Clear sky");
        view.set_current_icon(Icon {
            name: "clear-day",
            alt: "Clear sky".into(),
        });
        view.push_hourly_card(HourlyCard {
            time: "6:00 AM".into(),
            icon: Icon {
                name: "partly-cloudy-day",
                alt: "Mainly clear".into(),
            },
            temperature: "20°C".into(),
            humidity: "60%".into(),
            wind: "5 km/h S".into(),
        });

        let text = dashboard(&view);
        assert!(text.contains("Kathmandu  (Nepal • Asia/Kathmandu)"));
        assert!(text.contains("25°C  Clear sky  [clear-day]"));
        assert!(text.contains("6:00 AM"));
        assert!(text.contains("5 km/h S"));
        assert!(!text.contains("This week"));
    }

    #[test]
    fn suggestions_are_numbered_from_one() {
        let mut view = DashboardView::new();
        view.set_search_results(vec![SearchResultItem::from(&Location::kathmandu())]);
        view.set_visible(Section::SearchResults, true);

        assert_eq!(suggestions(&view), "  #1  Kathmandu  Nepal (Asia/Kathmandu)\n");

        view.set_visible(Section::SearchResults, false);
        assert_eq!(suggestions(&view), "");
    }
}
