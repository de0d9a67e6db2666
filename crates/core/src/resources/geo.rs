//! Vietnamese administrative divisions from the public provinces API.

use serde::{Deserialize, Serialize};

/// A province, district or ward as published by `provinces.open-api.vn`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Division {
    pub code: i32,
    pub name: String,
    #[serde(default)]
    pub codename: Option<String>,
}

/// `GET p/{code}?depth=2`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvinceWithDistricts {
    #[serde(flatten)]
    pub province: Division,
    #[serde(default)]
    pub districts: Vec<Division>,
}

/// `GET d/{code}?depth=2`.
#[derive(Debug, Clone, Deserialize)]
pub struct DistrictWithWards {
    #[serde(flatten)]
    pub district: Division,
    #[serde(default)]
    pub wards: Vec<Division>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_province_depth_two() {
        let json = r#"{"name": "Thành phố Hà Nội", "code": 1, "codename": "thanh_pho_ha_noi",
            "division_type": "thành phố trung ương", "phone_code": 24,
            "districts": [{"name": "Quận Ba Đình", "code": 1, "codename": "quan_ba_dinh"}]}"#;
        let province: ProvinceWithDistricts = serde_json::from_str(json).unwrap();
        assert_eq!(province.province.code, 1);
        assert_eq!(province.districts.len(), 1);
    }
}
