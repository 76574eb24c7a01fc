/// Returns the description of a Met Office significant weather code
///
/// # Arguments
///
/// * 'code' - the weather type code as reported, "NA" or 0 to 30
pub fn weather_type(code: &str) -> Option<&'static str> {
    let description = match code {
        "NA" => "Not available",
        "0" => "Clear night",
        "1" => "Sunny day",
        "2" => "Partly cloudy (night)",
        "3" => "Partly cloudy (day)",
        "4" => "Not used",
        "5" => "Mist",
        "6" => "Fog",
        "7" => "Cloudy",
        "8" => "Overcast",
        "9" => "Light rain shower (night)",
        "10" => "Light rain shower (day)",
        "11" => "Drizzle",
        "12" => "Light rain",
        "13" => "Heavy rain shower (night)",
        "14" => "Heavy rain shower (day)",
        "15" => "Heavy rain",
        "16" => "Sleet shower (night)",
        "17" => "Sleet shower (day)",
        "18" => "Sleet",
        "19" => "Hail shower (night)",
        "20" => "Hail shower (day)",
        "21" => "Hail",
        "22" => "Light snow shower (night)",
        "23" => "Light snow shower (day)",
        "24" => "Light snow",
        "25" => "Heavy snow shower (night)",
        "26" => "Heavy snow shower (day)",
        "27" => "Heavy snow",
        "28" => "Thunder shower (night)",
        "29" => "Thunder shower (day)",
        "30" => "Thunder",
        _ => return None,
    };

    Some(description)
}

/// Returns the description of a forecast visibility code
///
/// # Arguments
///
/// * 'code' - two letter visibility code
pub fn visibility(code: &str) -> Option<&'static str> {
    let description = match code {
        "UN" => "Unknown",
        "VP" => "Very poor - Less than 1 km",
        "PO" => "Poor - Between 1-4 km",
        "MO" => "Moderate - Between 4-10 km",
        "GO" => "Good - Between 10-20 km",
        "VG" => "Very good - Between 20-40 km",
        "EX" => "Excellent - More than 40 km",
        _ => return None,
    };

    Some(description)
}

/// Returns the Met Office guidance on UV exposure, there is no guidance for index 0
///
/// # Arguments
///
/// * 'index' - max UV index, must not be negative
pub fn uv_guidance(index: u32) -> Option<&'static str> {
    match index {
        0 => None,
        1..=2 => Some("Low exposure. No protection required. You can safely stay outside"),
        3..=5 => Some("Moderate exposure. Seek shade during midday hours, cover up and wear sunscreen"),
        6..=7 => Some("High exposure. Seek shade during midday hours, cover up and wear sunscreen"),
        8..=10 => Some("Very high. Avoid being outside during midday hours. Shirt, sunscreen and hat are essential"),
        _ => Some("Extreme. Avoid being outside during midday hours. Shirt, sunscreen and hat essential."),
    }
}

/// Returns a description of an observed pressure tendency
///
/// # Arguments
///
/// * 'code' - R(ising), F(alling) or S(teady)
pub fn pressure_tendency(code: &str) -> Option<&'static str> {
    match code {
        "R" => Some("Rise -> Better Weather"),
        "F" => Some("Fall -> Worse Weather"),
        "S" => Some("Steady"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_type() {
        assert_eq!(weather_type("0"), Some("Clear night"));
        assert_eq!(weather_type("12"), Some("Light rain"));
        assert_eq!(weather_type("30"), Some("Thunder"));
        assert_eq!(weather_type("NA"), Some("Not available"));
        assert_eq!(weather_type("31"), None);
        assert_eq!(weather_type("-1"), None);
    }

    #[test]
    fn test_visibility() {
        assert_eq!(visibility("VG"), Some("Very good - Between 20-40 km"));
        assert_eq!(visibility("XX"), None);
    }

    #[test]
    fn test_uv_guidance_bands() {
        assert_eq!(uv_guidance(0), None);
        assert!(uv_guidance(1).unwrap().starts_with("Low"));
        assert!(uv_guidance(2).unwrap().starts_with("Low"));
        assert!(uv_guidance(3).unwrap().starts_with("Moderate"));
        assert!(uv_guidance(7).unwrap().starts_with("High"));
        assert!(uv_guidance(10).unwrap().starts_with("Very high"));
        assert!(uv_guidance(11).unwrap().starts_with("Extreme"));
    }

    #[test]
    fn test_pressure_tendency() {
        assert_eq!(pressure_tendency("R"), Some("Rise -> Better Weather"));
        assert_eq!(pressure_tendency("Q"), None);
    }
}
