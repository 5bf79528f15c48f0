//! Map sync engine
//!
//! Derives marker and route primitives from an itinerary and issues
//! idempotent draw calls against a [`MapCanvas`]. Markers dedup cities by
//! first occurrence; the route line follows full per-day order, so a revisit
//! adds a route point but never a second marker. Every sync clears the
//! previous overlays first so refinements never accumulate stale drawings.

use tracing::debug;

use crate::plan::DayPlan;

/// Default view over India when no itinerary is drawn
pub const INDIA_CENTER: (f64, f64) = (20.5937, 78.9629);

/// Zoom level for the default India view
pub const DEFAULT_ZOOM: f64 = 5.0;

/// Zoom level when the whole itinerary sits in a single city
pub const SINGLE_CITY_ZOOM: f64 = 8.0;

/// Padding ratio applied when fitting the view to a route
pub const FIT_PADDING: f64 = 0.2;

/// A named point on the map
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub lat: f64,
    pub lng: f64,
    pub label: String,
}

/// Drawing surface contract for whatever renders the map
///
/// The tile/rendering library behind it is a collaborator; implementations
/// only need these five primitives.
pub trait MapCanvas {
    fn place_marker(&mut self, lat: f64, lng: f64, label: &str);
    fn draw_route(&mut self, points: &[(f64, f64)]);
    fn fit_to_route(&mut self, points: &[(f64, f64)], padding: f64);
    fn center_on(&mut self, lat: f64, lng: f64, zoom: f64);
    fn clear_overlays(&mut self);
}

/// Redraw the canvas from the given itinerary
///
/// An empty itinerary leaves any previously established default view alone.
pub fn sync(canvas: &mut dyn MapCanvas, itinerary: &[DayPlan]) {
    debug!(days = itinerary.len(), "map::sync: called");
    if itinerary.is_empty() {
        return;
    }

    canvas.clear_overlays();

    let markers = unique_markers(itinerary);
    for marker in &markers {
        canvas.place_marker(marker.lat, marker.lng, &marker.label);
    }

    let route = route_points(itinerary);
    if markers.len() > 1 {
        canvas.draw_route(&route);
        canvas.fit_to_route(&route, FIT_PADDING);
    } else if let Some(only) = markers.first() {
        canvas.center_on(only.lat, only.lng, SINGLE_CITY_ZOOM);
    }
}

/// Unique locations in first-occurrence order, one marker per city name
pub fn unique_markers(itinerary: &[DayPlan]) -> Vec<Marker> {
    let mut markers: Vec<Marker> = Vec::new();
    for day in itinerary {
        if !markers.iter().any(|m| m.label == day.city) {
            markers.push(Marker {
                lat: day.lat,
                lng: day.lng,
                label: day.city.clone(),
            });
        }
    }
    markers
}

/// Route line in per-day visit order, revisits included
pub fn route_points(itinerary: &[DayPlan]) -> Vec<(f64, f64)> {
    itinerary.iter().map(|d| (d.lat, d.lng)).collect()
}

/// Canvas that records primitives instead of drawing
///
/// The TUI renders from the recorded scene each frame; tests assert on it.
#[derive(Debug, Default)]
pub struct MapScene {
    pub markers: Vec<Marker>,
    pub route: Vec<(f64, f64)>,
    pub view: SceneView,
    /// Count of clear calls, for verifying stale-overlay removal
    pub clears: usize,
}

/// What the recorded scene wants the viewport to do
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SceneView {
    /// Untouched default view over India
    #[default]
    Default,
    /// Fit the viewport to the route with the given padding
    FitRoute { padding: f64 },
    /// Center on a single location at the given zoom
    Centered { lat: f64, lng: f64, zoom: f64 },
}

impl MapScene {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MapCanvas for MapScene {
    fn place_marker(&mut self, lat: f64, lng: f64, label: &str) {
        self.markers.push(Marker {
            lat,
            lng,
            label: label.to_string(),
        });
    }

    fn draw_route(&mut self, points: &[(f64, f64)]) {
        self.route = points.to_vec();
    }

    fn fit_to_route(&mut self, _points: &[(f64, f64)], padding: f64) {
        self.view = SceneView::FitRoute { padding };
    }

    fn center_on(&mut self, lat: f64, lng: f64, zoom: f64) {
        self.view = SceneView::Centered { lat, lng, zoom };
    }

    fn clear_overlays(&mut self) {
        self.markers.clear();
        self.route.clear();
        self.view = SceneView::Default;
        self.clears += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: u32, city: &str, lat: f64, lng: f64) -> DayPlan {
        DayPlan {
            day: n,
            title: city.to_string(),
            city: city.to_string(),
            lat,
            lng,
            transport: vec![],
            activities: vec![],
        }
    }

    #[test]
    fn test_revisit_dedups_marker_but_not_route() {
        // Days visit A, B, A, C: three markers, four route points.
        let itinerary = vec![
            day(1, "A", 10.0, 70.0),
            day(2, "B", 11.0, 71.0),
            day(3, "A", 10.0, 70.0),
            day(4, "C", 12.0, 72.0),
        ];
        let mut scene = MapScene::new();
        sync(&mut scene, &itinerary);

        let labels: Vec<&str> = scene.markers.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", "C"]);
        assert_eq!(
            scene.route,
            vec![(10.0, 70.0), (11.0, 71.0), (10.0, 70.0), (12.0, 72.0)]
        );
        assert_eq!(scene.view, SceneView::FitRoute { padding: FIT_PADDING });
    }

    #[test]
    fn test_single_city_centers_instead_of_routing() {
        let itinerary = vec![day(1, "Pune", 18.5, 73.8), day(2, "Pune", 18.5, 73.8)];
        let mut scene = MapScene::new();
        sync(&mut scene, &itinerary);

        assert_eq!(scene.markers.len(), 1);
        assert!(scene.route.is_empty());
        assert_eq!(
            scene.view,
            SceneView::Centered {
                lat: 18.5,
                lng: 73.8,
                zoom: SINGLE_CITY_ZOOM
            }
        );
    }

    #[test]
    fn test_empty_itinerary_leaves_view_untouched() {
        let mut scene = MapScene::new();
        sync(&mut scene, &[]);
        assert_eq!(scene.view, SceneView::Default);
        assert_eq!(scene.clears, 0);
    }

    #[test]
    fn test_resync_clears_previous_overlays() {
        let mut scene = MapScene::new();
        sync(&mut scene, &[day(1, "A", 10.0, 70.0), day(2, "B", 11.0, 71.0)]);
        assert_eq!(scene.markers.len(), 2);

        // Refinement collapses the trip to a single city; old overlays go.
        sync(&mut scene, &[day(1, "C", 12.0, 72.0)]);
        assert_eq!(scene.markers.len(), 1);
        assert_eq!(scene.markers[0].label, "C");
        assert!(scene.route.is_empty());
        assert_eq!(scene.clears, 2);
    }

    #[test]
    fn test_marker_coordinates_come_from_first_occurrence() {
        // Same city name reported with drifted coordinates on the revisit:
        // the marker keeps the first day's position.
        let itinerary = vec![day(1, "A", 10.0, 70.0), day(2, "A", 10.1, 70.1)];
        let markers = unique_markers(&itinerary);
        assert_eq!(markers.len(), 1);
        assert_eq!((markers[0].lat, markers[0].lng), (10.0, 70.0));
    }
}
