use serde::Deserialize;

/// Body of the reading service's `GET /`. Unknown fields are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Reading {
    pub temp: f64,
    pub humidity: f64,
    pub co2: f64,
}

/// Text shown on the LCD for one reading.
pub fn render(reading: &Reading) -> String {
    format!(
        "T:{:.1} / H:{:.1} Co2 : {:.0}",
        reading.temp, reading.humidity, reading.co2
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_rounded_values() {
        let reading = Reading {
            temp: 19.96,
            humidity: 55.44,
            co2: 612.3,
        };
        assert_eq!(render(&reading), "T:20.0 / H:55.4 Co2 : 612");
    }

    #[test]
    fn renders_values_from_f32_json() {
        let reading: Reading =
            serde_json::from_str(r#"{"temp":21.5,"humidity":48.2,"co2":415.0}"#).unwrap();
        assert_eq!(render(&reading), "T:21.5 / H:48.2 Co2 : 415");
    }

    #[test]
    fn ignores_unknown_fields_but_requires_known_ones() {
        let ok: Result<Reading, _> =
            serde_json::from_str(r#"{"temp":1,"humidity":2,"co2":3,"extra":true}"#);
        assert!(ok.is_ok());
        let missing: Result<Reading, _> = serde_json::from_str(r#"{"temp":1,"humidity":2}"#);
        assert!(missing.is_err());
    }
}
