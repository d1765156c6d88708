//! Map markers
//!
//! One marker per member placed at the centroid of the member's country,
//! plus a greedy radius clustering so thousands of co-located markers
//! collapse to one counted cluster.

use roster_common::options::CountryTable;
use roster_common::Member;
use serde::Serialize;

/// Default clustering radius in degrees
pub const DEFAULT_CLUSTER_RADIUS: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub member_id: i64,
    pub lat: f64,
    pub lng: f64,
    pub popup_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerCluster {
    /// Mean position of the members in the cluster
    pub lat: f64,
    pub lng: f64,
    pub count: usize,
    pub member_ids: Vec<i64>,
}

/// Markers for members with a known country; others are skipped
pub fn build_markers(members: &[Member], countries: &CountryTable) -> Vec<MapMarker> {
    members
        .iter()
        .filter_map(|member| {
            let country = countries.get(&member.country_code)?;
            Some(MapMarker {
                member_id: member.id,
                lat: country.latitude,
                lng: country.longitude,
                popup_text: format!("Chingu_{}", member.id),
            })
        })
        .collect()
}

/// Greedy clustering in input order.
///
/// A marker joins the first cluster whose seed lies within `radius_deg`
/// (planar distance in degrees), otherwise it seeds a new cluster.
pub fn cluster(markers: &[MapMarker], radius_deg: f64) -> Vec<MarkerCluster> {
    struct Acc {
        seed: (f64, f64),
        sum: (f64, f64),
        ids: Vec<i64>,
    }

    let mut acc: Vec<Acc> = Vec::new();
    for marker in markers {
        let hit = acc.iter_mut().find(|c| {
            let dlat = c.seed.0 - marker.lat;
            let dlng = c.seed.1 - marker.lng;
            (dlat * dlat + dlng * dlng).sqrt() <= radius_deg
        });

        match hit {
            Some(c) => {
                c.sum.0 += marker.lat;
                c.sum.1 += marker.lng;
                c.ids.push(marker.member_id);
            }
            None => acc.push(Acc {
                seed: (marker.lat, marker.lng),
                sum: (marker.lat, marker.lng),
                ids: vec![marker.member_id],
            }),
        }
    }

    acc.into_iter()
        .map(|c| {
            let n = c.ids.len() as f64;
            MarkerCluster {
                lat: c.sum.0 / n,
                lng: c.sum.1 / n,
                count: c.ids.len(),
                member_ids: c.ids,
            }
        })
        .collect()
}
