use super::{bool_as_int, Alignment, ReportType};
use serde::{Deserialize, Serialize};

/// Formatting and fiscal parameters of a task
///
/// Every field is optional; unset fields are left out of the JSON so the
/// device keeps its own defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Parameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<i32>,

    #[serde(with = "bool_as_int::option", skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,

    #[serde(with = "bool_as_int::option", skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,

    #[serde(
        rename = "dblheight",
        with = "bool_as_int::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub double_height: Option<bool>,

    #[serde(with = "bool_as_int::option", skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,

    #[serde(with = "bool_as_int::option", skip_serializing_if = "Option::is_none")]
    pub overline: Option<bool>,

    #[serde(with = "bool_as_int::option", skip_serializing_if = "Option::is_none")]
    pub negative: Option<bool>,

    #[serde(with = "bool_as_int::option", skip_serializing_if = "Option::is_none")]
    pub upside_down: Option<bool>,

    #[serde(with = "bool_as_int::option", skip_serializing_if = "Option::is_none")]
    pub zero_slashed: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub char_rotation: Option<i32>,

    #[serde(with = "bool_as_int::option", skip_serializing_if = "Option::is_none")]
    pub standard_color: Option<bool>,

    #[serde(with = "bool_as_int::option", skip_serializing_if = "Option::is_none")]
    pub wrap: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,

    #[serde(with = "bool_as_int::option", skip_serializing_if = "Option::is_none")]
    pub new_line: Option<bool>,

    #[serde(with = "bool_as_int::option", skip_serializing_if = "Option::is_none")]
    pub line_spacing_max: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_code_height: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_code_type: Option<String>,

    /// Barcode carries a control symbol
    #[serde(
        rename = "BarCodeHasCC",
        with = "bool_as_int::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub bar_code_has_control_symbol: Option<bool>,

    #[serde(with = "bool_as_int::option", skip_serializing_if = "Option::is_none")]
    pub bar_code_print_text: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    #[serde(rename = "Summ", skip_serializing_if = "Option::is_none")]
    pub sum: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_close: Option<i32>,

    #[serde(
        rename = "EnableCheckSumm",
        with = "bool_as_int::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub enable_check_sum: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<i32>,

    #[serde(with = "bool_as_int::option", skip_serializing_if = "Option::is_none")]
    pub print_doc: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_type: Option<ReportType>,
}

impl Parameters {
    pub fn is_empty(&self) -> bool {
        *self == Parameters::default()
    }

    /// Alignment with the printer default applied
    pub fn alignment_or_default(&self) -> Alignment {
        self.alignment.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_serializes_to_empty_object() {
        assert_eq!(serde_json::to_string(&Parameters::default()).unwrap(), "{}");
        assert!(Parameters::default().is_empty());
    }

    #[test]
    fn test_wire_names() {
        let params = Parameters {
            double_height: Some(true),
            bar_code_has_control_symbol: Some(false),
            sum: Some(150.5),
            enable_check_sum: Some(true),
            upside_down: Some(true),
            report_type: Some(ReportType::X),
            alignment: Some(Alignment::Center),
            ..Default::default()
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["dblheight"], 1);
        assert_eq!(value["BarCodeHasCC"], 0);
        assert_eq!(value["Summ"], 150.5);
        assert_eq!(value["EnableCheckSumm"], 1);
        assert_eq!(value["upsideDown"], 1);
        assert_eq!(value["reportType"], 2);
        assert_eq!(value["alignment"], "Center");
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let params: Parameters =
            serde_json::from_str(r#"{"bold":1,"vendorExtra":"x","price":12.0}"#).unwrap();
        assert_eq!(params.bold, Some(true));
        assert_eq!(params.price, Some(12.0));
        assert!(!params.is_empty());
    }

    #[test]
    fn test_alignment_defaults_to_left() {
        assert_eq!(Parameters::default().alignment_or_default(), Alignment::Left);
    }
}
