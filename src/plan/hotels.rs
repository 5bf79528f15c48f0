//! Hotel search links for a day's city
//!
//! The app never books anything itself; it hands the user pre-filled search
//! URLs on the usual Indian booking portals for the city they are stopping
//! in. Pure string building, no network.

use tracing::debug;

/// One booking portal with a city-search URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotelSite {
    pub name: &'static str,
    pub url: String,
}

/// Search links for the given city, in fixed display order
pub fn hotel_search_links(city: &str) -> Vec<HotelSite> {
    debug!(%city, "hotel_search_links: called");
    vec![
        HotelSite {
            name: "Booking.com",
            url: query_url("https://www.booking.com/searchresults.html", "ss", city),
        },
        HotelSite {
            name: "Agoda",
            url: query_url("https://www.agoda.com/search", "city", city),
        },
        HotelSite {
            name: "MakeMyTrip",
            url: query_url("https://www.makemytrip.com/hotels/hotel-listing/", "city", city),
        },
        HotelSite {
            name: "Goibibo",
            url: format!("https://www.goibibo.com/hotels/find-hotels-in-{}/", city_slug(city)),
        },
    ]
}

fn query_url(base: &str, key: &str, city: &str) -> String {
    reqwest::Url::parse_with_params(base, &[(key, city)])
        .map(|u| u.to_string())
        // The bases are constant and valid; this arm is unreachable.
        .unwrap_or_else(|_| base.to_string())
}

/// Lowercased, whitespace collapsed to hyphens
fn city_slug(city: &str) -> String {
    city.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_cover_all_four_portals_in_order() {
        let links = hotel_search_links("Goa");
        let names: Vec<&str> = links.iter().map(|s| s.name).collect();
        assert_eq!(names, ["Booking.com", "Agoda", "MakeMyTrip", "Goibibo"]);
    }

    #[test]
    fn test_query_urls_carry_the_city() {
        let links = hotel_search_links("Pune");
        assert_eq!(
            links[0].url,
            "https://www.booking.com/searchresults.html?ss=Pune"
        );
        assert_eq!(links[1].url, "https://www.agoda.com/search?city=Pune");
        assert_eq!(
            links[2].url,
            "https://www.makemytrip.com/hotels/hotel-listing/?city=Pune"
        );
    }

    #[test]
    fn test_city_with_spaces_is_encoded_and_slugged() {
        let links = hotel_search_links("New Delhi");
        // Query parameters never carry a raw space.
        assert!(!links[0].url.contains(' '));
        assert!(links[0].url.starts_with("https://www.booking.com/searchresults.html?ss=New"));
        assert_eq!(
            links[3].url,
            "https://www.goibibo.com/hotels/find-hotels-in-new-delhi/"
        );
    }
}
