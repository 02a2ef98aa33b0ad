//! Request and response bodies of the print server API

use crate::model::{bool_as_int, EquipmentResponse, Task, Tax};
use crate::types::{EquipmentError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(flatten)]
    pub base: EquipmentResponse,
    #[serde(rename = "value", default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionResponse {
    #[serde(flatten)]
    pub base: EquipmentResponse,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrintDeviceType {
    #[serde(rename = "typeId", default)]
    pub id: i32,
    #[serde(rename = "typeName", default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintDeviceModel {
    #[serde(rename = "modelId", default)]
    pub id: String,
    #[serde(rename = "modelName", default)]
    pub name: String,
    #[serde(default)]
    pub support_driver_codes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrintDeviceDriver {
    #[serde(rename = "driverId", default)]
    pub id: String,
    #[serde(rename = "driverName", default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DevicesResponse {
    #[serde(flatten)]
    pub base: EquipmentResponse,
    #[serde(rename = "supportDeviceType", default)]
    pub device_types: Vec<PrintDeviceType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelsResponse {
    #[serde(flatten)]
    pub base: EquipmentResponse,
    #[serde(default)]
    pub models: Vec<PrintDeviceModel>,
    #[serde(default)]
    pub drivers: Vec<PrintDeviceDriver>,
}

impl ModelsResponse {
    /// Drivers that can run the given model
    pub fn drivers_for(&self, model: &PrintDeviceModel) -> Vec<&PrintDeviceDriver> {
        self.drivers
            .iter()
            .filter(|d| model.support_driver_codes.contains(&d.id))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxesResponse {
    #[serde(flatten)]
    pub base: EquipmentResponse,
    #[serde(default)]
    pub taxes: Vec<Tax>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompressedSettingsResponse {
    #[serde(flatten)]
    pub base: EquipmentResponse,
    #[serde(rename = "settingZip", alias = "compressedSettings", default)]
    pub compressed_settings: String,
}

/// Values of other settings that control a setting's visibility
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dependency<T> {
    #[serde(rename = "depend", default)]
    pub settings_ids: Vec<String>,
    #[serde(rename = "value", default = "Vec::new")]
    pub values: Vec<T>,
    #[serde(rename = "visible", with = "bool_as_int", default)]
    pub is_visible: bool,
}

/// A device setting as the server describes it, with its current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsPresenter<T, X = NoExtra> {
    #[serde(default)]
    pub id: String,
    #[serde(default = "Option::default")]
    pub value: Option<T>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sort: i32,
    #[serde(rename = "depend", default = "Vec::new")]
    pub dependencies: Vec<Dependency<T>>,
    #[serde(flatten)]
    pub extra: X,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoExtra {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringExtra {
    #[serde(with = "bool_as_int", default)]
    pub is_number: bool,
    #[serde(default)]
    pub max_length: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListValue {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub value_id: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListExtra {
    #[serde(rename = "list", default)]
    pub values: Vec<ListValue>,
}

/// Boolean settings carry their value as `0`/`1`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntBool(#[serde(with = "bool_as_int")] pub bool);

pub type BooleanSettingsPresenter = SettingsPresenter<IntBool>;
pub type StringSettingsPresenter = SettingsPresenter<String, StringExtra>;
pub type ListSettingsPresenter = SettingsPresenter<i32, ListExtra>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    #[serde(flatten)]
    pub base: EquipmentResponse,
    #[serde(default)]
    pub driver_id: String,
    #[serde(default)]
    pub model_id: String,
    #[serde(rename = "typeBool", default)]
    pub bool_settings: Vec<BooleanSettingsPresenter>,
    #[serde(rename = "typeString", default)]
    pub string_settings: Vec<StringSettingsPresenter>,
    #[serde(rename = "typeList", default)]
    pub list_settings: Vec<ListSettingsPresenter>,
}

impl SettingsResponse {
    /// Set a boolean setting by id; false when no such setting exists
    pub fn set_bool(&mut self, id: &str, value: bool) -> bool {
        set_value(&mut self.bool_settings, id, IntBool(value))
    }

    pub fn set_string(&mut self, id: &str, value: impl Into<String>) -> bool {
        set_value(&mut self.string_settings, id, value.into())
    }

    pub fn set_list(&mut self, id: &str, value_id: i32) -> bool {
        set_value(&mut self.list_settings, id, value_id)
    }

    /// Set a setting from operator text, whatever its kind
    ///
    /// Booleans take `1`/`0`/`true`/`false`; list settings take one of
    /// their value ids, or a value title.
    pub fn apply(&mut self, id: &str, raw: &str) -> Result<()> {
        let raw = raw.trim();
        if self.bool_settings.iter().any(|s| s.id == id) {
            let value = match raw.to_ascii_lowercase().as_str() {
                "1" | "true" => true,
                "0" | "false" => false,
                _ => return Err(invalid_value(id, raw)),
            };
            self.set_bool(id, value);
            return Ok(());
        }
        if self.set_string(id, raw) {
            return Ok(());
        }
        if let Some(setting) = self.list_settings.iter_mut().find(|s| s.id == id) {
            let values = &setting.extra.values;
            let value_id = raw
                .parse::<i32>()
                .ok()
                .filter(|n| values.is_empty() || values.iter().any(|v| v.value_id == *n))
                .or_else(|| values.iter().find(|v| v.title == raw).map(|v| v.value_id))
                .ok_or_else(|| invalid_value(id, raw))?;
            setting.value = Some(value_id);
            return Ok(());
        }
        Err(EquipmentError::Config(format!("unknown setting '{}'", id)))
    }

    /// Current values, ready for compression
    pub fn to_values(&self, type_id: i32) -> SettingsValues {
        SettingsValues {
            type_id,
            model_id: self.model_id.clone(),
            driver_id: self.driver_id.clone(),
            bool_values: self.bool_settings.clone(),
            string_values: self.string_settings.clone(),
            list_values: self.list_settings.clone(),
        }
    }
}

fn invalid_value(id: &str, raw: &str) -> EquipmentError {
    EquipmentError::Config(format!("invalid value '{}' for setting '{}'", raw, id))
}

fn set_value<T, X>(settings: &mut [SettingsPresenter<T, X>], id: &str, value: T) -> bool {
    match settings.iter_mut().find(|s| s.id == id) {
        Some(setting) => {
            setting.value = Some(value);
            true
        }
        None => false,
    }
}

/// Body of `/deviceSettingZip`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsValues {
    pub type_id: i32,
    pub model_id: String,
    pub driver_id: String,
    #[serde(rename = "settingBool")]
    pub bool_values: Vec<BooleanSettingsPresenter>,
    #[serde(rename = "settingString")]
    pub string_values: Vec<StringSettingsPresenter>,
    #[serde(rename = "settingList")]
    pub list_values: Vec<ListSettingsPresenter>,
}

/// Body of `/execute`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TasksRequest {
    #[serde(rename = "taskTable")]
    pub tasks: Vec<Task>,
    #[serde(rename = "settingZip")]
    pub settings: String,
}
