use crate::types::{Badge, Label, Marker, Record};
use geo::{BoundingRect, MultiPoint, Point, Rect};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

// One colour per category letter A-Z
const CATEGORY_COLORS: [&str; 26] = [
    "#e6194b", "#3cb44b", "#ffe119", "#0082c8", "#f58231",
    "#911eb4", "#46f0f0", "#f032e6", "#d2f53c", "#fabebe",
    "#008080", "#e6beff", "#aa6e28", "#fffac8", "#800000",
    "#aaffc3", "#808000", "#ffd8b1", "#000080", "#808080",
    "#bcf5a9", "#fdcce5", "#9a6324", "#fff", "#000", "#f0f",
];
pub const FALLBACK_COLOR: &str = "#333";
const DEFAULT_LETTER: char = 'A';
const LABEL_OFFSET: [i32; 2] = [0, 18];

/// The mapping widget the renderer draws into.
pub trait MapSurface {
    fn clear_layers(&mut self);
    fn add_marker(&mut self, marker: Marker);
    fn fit_bounds(&mut self, bounds: Rect<f64>, padding: u32);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub show_labels: bool,
    pub fit_padding: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub drawn: usize,
    // Records without usable coordinates
    pub skipped: usize,
}

/// First character of the category, uppercased. A character whose uppercase
/// form is more than one letter (`ß` -> `SS`) is kept as-is, so it gets no
/// table colour.
pub fn category_letter(category: &str) -> char {
    let Some(first) = category.chars().next() else {
        return DEFAULT_LETTER;
    };
    let mut upper = first.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(letter), None) => letter,
        _ => first,
    }
}

pub fn category_color(letter: char) -> &'static str {
    if letter.is_ascii_uppercase() {
        CATEGORY_COLORS[(letter as u8 - b'A') as usize]
    } else {
        FALLBACK_COLOR
    }
}

/// Longest leading number, the way `parseFloat` reads `"53.9N"` as 53.9.
fn parse_coordinate(raw: Option<&str>) -> Option<f64> {
    let raw = raw?.trim_start();
    raw.char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .rev()
        .find_map(|end| raw[..end].parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn badge_html(letter: char, color: &str) -> String {
    format!(
        "<div style=\"background:{color};color:#fff;width:32px;height:32px;display:flex;\
         align-items:center;justify-content:center;font-size:18px;font-weight:bold;\
         border-radius:50%;\">{letter}</div>"
    )
}

/// `None` when the record has no post: absent, empty or "no".
fn blog_url(record: &Record) -> Option<String> {
    let blog = record.blog();
    if blog.is_empty() || blog.eq_ignore_ascii_case("no") {
        None
    } else {
        Some(blog.to_string())
    }
}

fn popup_html(record: &Record, blog: Option<&str>) -> String {
    let blog_line = match blog {
        Some(url) => format!("<a href=\"{url}\" target=\"_blank\" rel=\"noopener noreferrer\">Read the post</a>"),
        None => "No".to_string(),
    };
    format!(
        "<b>{}</b><br>{}<br>Visited: {}<br>Blog: {}",
        record.place(),
        record.category(),
        record.date(),
        blog_line
    )
}

pub fn build_marker(record: &Record, show_label: bool) -> Option<Marker> {
    let lat = parse_coordinate(record.get("Lat"))?;
    let lon = parse_coordinate(record.get("Long"))?;

    let letter = category_letter(record.category());
    let color = category_color(letter);
    let blog = blog_url(record);
    let popup = popup_html(record, blog.as_deref());

    let label = show_label.then(|| Label {
        text: record.place().to_string(),
        offset: LABEL_OFFSET,
        permanent: true,
        interactive: false,
    });

    Some(Marker {
        position: Point::new(lon, lat),
        place: record.place().to_string(),
        category: record.category().to_string(),
        date: record.date().to_string(),
        blog,
        badge: Badge {
            letter,
            color,
            html: badge_html(letter, color),
        },
        popup,
        label,
    })
}

/// Replace everything on the surface with one marker per record that has
/// valid coordinates, then fit the viewport to them if any were drawn.
pub fn render_markers<S: MapSurface>(
    view: &[Record],
    options: &RenderOptions,
    surface: &mut S,
) -> RenderSummary {
    surface.clear_layers();

    let mut points: Vec<Point<f64>> = Vec::with_capacity(view.len());
    let mut summary = RenderSummary::default();

    for record in view {
        match build_marker(record, options.show_labels) {
            Some(marker) => {
                points.push(marker.position);
                surface.add_marker(marker);
                summary.drawn += 1;
            }
            None => summary.skipped += 1,
        }
    }

    if let Some(bounds) = MultiPoint::from(points).bounding_rect() {
        surface.fit_bounds(bounds, options.fit_padding);
    }

    debug!("Rendered {} markers, skipped {}", summary.drawn, summary.skipped);
    summary
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewportFit {
    pub south_west: [f64; 2], // [lat, lon]
    pub north_east: [f64; 2],
    pub padding: u32,
}

/// In-memory surface: what the map would show, ready to serialise.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Scene {
    pub markers: Vec<Marker>,
    pub viewport: Option<ViewportFit>,
}

impl MapSurface for Scene {
    fn clear_layers(&mut self) {
        self.markers.clear();
    }

    fn add_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    fn fit_bounds(&mut self, bounds: Rect<f64>, padding: u32) {
        self.viewport = Some(ViewportFit {
            south_west: [bounds.min().y, bounds.min().x],
            north_east: [bounds.max().y, bounds.max().x],
            padding,
        });
    }
}

impl Scene {
    pub fn to_geojson(&self) -> FeatureCollection {
        let features = self
            .markers
            .iter()
            .map(|marker| {
                let mut properties = JsonObject::new();
                properties.insert("place".to_string(), json!(marker.place));
                properties.insert("category".to_string(), json!(marker.category));
                properties.insert("date".to_string(), json!(marker.date));
                properties.insert("blog".to_string(), json!(marker.blog));
                properties.insert("letter".to_string(), json!(marker.badge.letter.to_string()));
                properties.insert("color".to_string(), json!(marker.badge.color));
                properties.insert("popup".to_string(), json!(marker.popup));
                properties.insert("label".to_string(), json!(marker.label.as_ref().map(|l| &l.text)));

                Feature {
                    bbox: None,
                    geometry: Some(Geometry::new(Value::Point(vec![
                        marker.position.x(),
                        marker.position.y(),
                    ]))),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs.iter().copied().collect()
    }

    fn york() -> Record {
        record(&[
            ("Place", "York"),
            ("County", "Yorkshire"),
            ("Category", "A"),
            ("Lat", "53.9"),
            ("Long", "-1.08"),
            ("Date", "2023-05-01"),
            ("Visited", "yes"),
            ("Blog", "no"),
        ])
    }

    #[test]
    fn test_letters_and_colors() {
        assert_eq!(category_letter("castle"), 'C');
        assert_eq!(category_letter(""), 'A');
        assert_eq!(category_color('A'), "#e6194b");
        assert_eq!(category_color('Z'), "#f0f");
        assert_eq!(category_color('7'), FALLBACK_COLOR);
        assert_eq!(category_color(category_letter("élan")), FALLBACK_COLOR);
    }

    #[test]
    fn test_multi_letter_uppercase_is_gray() {
        assert_eq!(category_letter("ßtraße"), 'ß');
        assert_eq!(category_color(category_letter("ßtraße")), FALLBACK_COLOR);
    }

    #[test]
    fn test_coordinate_prefix_parsing() {
        assert_eq!(parse_coordinate(Some("53.9N")), Some(53.9));
        assert_eq!(parse_coordinate(Some(" -1.08 ")), Some(-1.08));
        assert_eq!(parse_coordinate(Some("1e2km")), Some(100.0));
        assert_eq!(parse_coordinate(Some("abc")), None);
        assert_eq!(parse_coordinate(Some("N53.9")), None);
        assert_eq!(parse_coordinate(Some("")), None);
        assert_eq!(parse_coordinate(Some("NaN")), None);
        assert_eq!(parse_coordinate(Some("inf")), None);
        assert_eq!(parse_coordinate(None), None);
    }

    #[test]
    fn test_single_marker() {
        let mut scene = Scene::default();
        let options = RenderOptions { show_labels: false, fit_padding: 40 };
        let summary = render_markers(&[york()], &options, &mut scene);

        assert_eq!(summary, RenderSummary { drawn: 1, skipped: 0 });
        let marker = &scene.markers[0];
        assert_eq!(marker.position, Point::new(-1.08, 53.9));
        assert_eq!(marker.badge.letter, 'A');
        assert_eq!(marker.badge.color, "#e6194b");
        assert!(marker.badge.html.contains("background:#e6194b"));
        assert!(marker.popup.contains("<b>York</b>"));
        assert!(marker.popup.contains("Visited: 2023-05-01"));
        assert!(marker.popup.ends_with("Blog: No"));
        assert!(marker.label.is_none());

        let viewport = scene.viewport.unwrap();
        assert_eq!(viewport.south_west, [53.9, -1.08]);
        assert_eq!(viewport.north_east, [53.9, -1.08]);
        assert_eq!(viewport.padding, 40);
    }

    #[test]
    fn test_blog_link_and_label() {
        let mut rec = york();
        rec.fields.insert("Blog".into(), "https://example.com/york".into());
        let marker = build_marker(&rec, true).unwrap();

        assert_eq!(marker.blog.as_deref(), Some("https://example.com/york"));
        assert!(marker.popup.contains("href=\"https://example.com/york\""));
        assert!(marker.popup.contains("target=\"_blank\""));

        let label = marker.label.unwrap();
        assert_eq!(label.text, "York");
        assert!(label.permanent);
        assert!(!label.interactive);

        rec.fields.insert("Blog".into(), "NO".into());
        assert!(build_marker(&rec, false).unwrap().popup.ends_with("Blog: No"));
        rec.fields.remove("Blog");
        assert!(build_marker(&rec, false).unwrap().popup.ends_with("Blog: No"));
    }

    #[test]
    fn test_bad_coordinates_skipped() {
        let mut bad = york();
        bad.fields.insert("Lat".into(), "abc".into());
        let mut far = york();
        far.fields.insert("Lat".into(), "51.0".into());
        far.fields.insert("Long".into(), "1.0".into());

        let mut scene = Scene::default();
        let summary = render_markers(&[bad, far], &RenderOptions::default(), &mut scene);

        assert_eq!(summary, RenderSummary { drawn: 1, skipped: 1 });
        assert_eq!(scene.markers.len(), 1);
        let viewport = scene.viewport.unwrap();
        assert_eq!(viewport.south_west, [51.0, 1.0]);
        assert_eq!(viewport.north_east, [51.0, 1.0]);
    }

    #[test]
    fn test_no_valid_points_leaves_viewport() {
        let mut scene = Scene::default();
        render_markers(&[york()], &RenderOptions::default(), &mut scene);
        let before = scene.viewport;

        let mut bad = york();
        bad.fields.remove("Long");
        let summary = render_markers(&[bad], &RenderOptions::default(), &mut scene);

        assert_eq!(summary.drawn, 0);
        assert!(scene.markers.is_empty());
        assert_eq!(scene.viewport, before);
    }

    #[test]
    fn test_rerender_replaces_markers() {
        let mut scene = Scene::default();
        render_markers(&[york(), york()], &RenderOptions::default(), &mut scene);
        render_markers(&[york()], &RenderOptions::default(), &mut scene);
        assert_eq!(scene.markers.len(), 1);
    }

    #[test]
    fn test_geojson_export() {
        let mut scene = Scene::default();
        render_markers(&[york()], &RenderOptions::default(), &mut scene);
        let collection = scene.to_geojson();

        assert_eq!(collection.features.len(), 1);
        let feature = &collection.features[0];
        match &feature.geometry.as_ref().unwrap().value {
            Value::Point(coords) => assert_eq!(coords, &vec![-1.08, 53.9]),
            other => panic!("unexpected geometry {other:?}"),
        }
        assert_eq!(feature.property("letter"), Some(&json!("A")));
        assert_eq!(feature.property("blog"), Some(&serde_json::Value::Null));
    }
}
