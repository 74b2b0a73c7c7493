use crate::error::AppError;
use crate::overpass::BoundingBox;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct ImportOsmRequest {
    pub south: Option<f64>,
    pub west: Option<f64>,
    pub north: Option<f64>,
    pub east: Option<f64>,
}

impl ImportOsmRequest {
    pub fn bounds(&self) -> Result<BoundingBox, AppError> {
        match (self.south, self.west, self.north, self.east) {
            (Some(south), Some(west), Some(north), Some(east)) => {
                Ok(BoundingBox { south, west, north, east })
            }
            _ => Err(AppError::validation("south, west, north, east are required (numbers)")),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ImportOsmResponse {
    /// Records newly inserted by this run.
    pub imported: u64,
    /// Elements the upstream response contained.
    pub processed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_four_bounds_are_required() {
        let req = ImportOsmRequest { south: Some(47.0), west: Some(8.0), north: Some(48.0), east: None };
        assert!(req.bounds().is_err());

        let req = ImportOsmRequest { south: Some(47.0), west: Some(8.0), north: Some(48.0), east: Some(9.0) };
        let bbox = req.bounds().expect("valid");
        assert_eq!(bbox.north, 48.0);
    }
}
