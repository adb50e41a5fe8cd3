//! Marker and route colours.

use std::fmt;

use crate::domain::SpotCategory;

/// Named marker colours understood by the map renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerColor {
    Red,
    Blue,
    Green,
    Orange,
    Violet,
    Gold,
    Grey,
    Black,
}

impl MarkerColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerColor::Red => "red",
            MarkerColor::Blue => "blue",
            MarkerColor::Green => "green",
            MarkerColor::Orange => "orange",
            MarkerColor::Violet => "violet",
            MarkerColor::Gold => "gold",
            MarkerColor::Grey => "grey",
            MarkerColor::Black => "black",
        }
    }
}

impl fmt::Display for MarkerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Day palette; day `n` uses entry `(n - 1) % 8`.
pub const DAY_COLORS: [MarkerColor; 8] = [
    MarkerColor::Red,
    MarkerColor::Blue,
    MarkerColor::Green,
    MarkerColor::Orange,
    MarkerColor::Violet,
    MarkerColor::Gold,
    MarkerColor::Grey,
    MarkerColor::Black,
];

/// Colour of a 1-based day. Day 0 is treated as day 1.
pub fn day_color(day: u32) -> MarkerColor {
    let index = day.saturating_sub(1) as usize % DAY_COLORS.len();
    DAY_COLORS[index]
}

/// Colour used for catalogue markers, which are not tied to a day.
pub fn category_color(category: SpotCategory) -> MarkerColor {
    match category {
        SpotCategory::History => MarkerColor::Red,
        SpotCategory::Nature => MarkerColor::Green,
        SpotCategory::Food => MarkerColor::Orange,
        SpotCategory::Shopping => MarkerColor::Violet,
        SpotCategory::Art => MarkerColor::Gold,
        SpotCategory::Relax => MarkerColor::Blue,
        SpotCategory::Culture => MarkerColor::Grey,
        _ => MarkerColor::Blue,
    }
}

/// How a plan marker is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub color: MarkerColor,
    pub opacity: f32,
    pub z_offset: i32,
}

impl MarkerStyle {
    /// Style for a marker on `day` while `selected_day` is in focus.
    pub fn for_day(day: u32, selected_day: u32) -> Self {
        let selected = day == selected_day;
        Self {
            color: day_color(day),
            opacity: if selected { 1.0 } else { 0.5 },
            z_offset: if selected { 1000 } else { 0 },
        }
    }
}

/// How a day's route polyline is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteStyle {
    pub color: MarkerColor,
    pub weight: u8,
    pub opacity: f32,
    /// Unselected days are drawn dashed.
    pub dashed: bool,
    /// Selected days get an animated line with direction arrows.
    pub animated: bool,
}

impl RouteStyle {
    pub fn for_day(day: u32, selected_day: u32) -> Self {
        let selected = day == selected_day;
        Self {
            color: day_color(day),
            weight: if selected { 6 } else { 3 },
            opacity: if selected { 0.9 } else { 0.4 },
            dashed: !selected,
            animated: selected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_colors_cycle() {
        assert_eq!(day_color(1), MarkerColor::Red);
        assert_eq!(day_color(2), MarkerColor::Blue);
        assert_eq!(day_color(8), MarkerColor::Black);
        assert_eq!(day_color(9), MarkerColor::Red);
        assert_eq!(day_color(0), MarkerColor::Red);
    }

    #[test]
    fn selected_day_is_emphasised() {
        let selected = MarkerStyle::for_day(2, 2);
        assert_eq!(selected.opacity, 1.0);
        assert_eq!(selected.z_offset, 1000);
        assert_eq!(selected.color, MarkerColor::Blue);

        let other = MarkerStyle::for_day(3, 2);
        assert_eq!(other.opacity, 0.5);
        assert_eq!(other.z_offset, 0);
    }

    #[test]
    fn route_style() {
        let selected = RouteStyle::for_day(1, 1);
        assert_eq!(selected.weight, 6);
        assert!(selected.animated && !selected.dashed);

        let other = RouteStyle::for_day(4, 1);
        assert_eq!(other.weight, 3);
        assert_eq!(other.opacity, 0.4);
        assert_eq!(other.color, MarkerColor::Orange);
        assert!(other.dashed);
    }

    #[test]
    fn category_colors() {
        assert_eq!(category_color(SpotCategory::History), MarkerColor::Red);
        assert_eq!(category_color(SpotCategory::Culture), MarkerColor::Grey);
        assert_eq!(category_color(SpotCategory::Hotel), MarkerColor::Blue);
    }
}
