//! `Contents/Info.plist` model for the generated bundle.

use serde::{Deserialize, Serialize};

/// Bundle manifest written as an XML property list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoPlist {
    #[serde(rename = "CFBundleShortVersionString")]
    pub short_version: String,
    #[serde(rename = "CFBundleSignature")]
    pub signature: String,
    #[serde(rename = "CFBundleInfoDictionaryVersion")]
    pub info_dictionary_version: String,
    #[serde(rename = "NSHumanReadableCopyright")]
    pub copyright: String,
    #[serde(rename = "CFBundleIconFile")]
    pub icon_file: String,
    #[serde(rename = "CFBundleIdentifier")]
    pub identifier: String,
    #[serde(rename = "CFBundleDocumentTypes")]
    pub document_types: Vec<DocumentType>,
    #[serde(rename = "CFBundleDevelopmentRegion")]
    pub development_region: String,
    #[serde(rename = "CFBundleExecutable")]
    pub executable: String,
    #[serde(rename = "CFBundleName")]
    pub name: String,
    #[serde(rename = "LSMinimumSystemVersion")]
    pub minimum_system_version: String,
    #[serde(rename = "LSMultipleInstancesProhibited")]
    pub multiple_instances_prohibited: bool,
    #[serde(rename = "CFBundlePackageType")]
    pub package_type: String,
    #[serde(rename = "CFBundleVersion")]
    pub version: String,
}

/// A document type the app registers for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentType {
    #[serde(rename = "CFBundleTypeName")]
    pub name: String,
    #[serde(rename = "CFBundleTypeRole")]
    pub role: String,
    #[serde(rename = "CFBundleTypeIconFile")]
    pub icon_file: String,
    #[serde(rename = "CFBundleTypeExtensions")]
    pub extensions: Vec<String>,
}

impl InfoPlist {
    /// Manifest for a property list viewer app launched via `<app_name>.command`.
    pub fn for_app(app_name: &str, identifier: &str, copyright: &str) -> Self {
        Self {
            short_version: "0.0".to_string(),
            signature: "????".to_string(),
            info_dictionary_version: "0.0".to_string(),
            copyright: copyright.to_string(),
            icon_file: "shortcut.icns".to_string(),
            identifier: identifier.to_string(),
            document_types: vec![DocumentType {
                name: "Property List".to_string(),
                role: "Viewer".to_string(),
                icon_file: "plist".to_string(),
                extensions: vec!["plist".to_string()],
            }],
            development_region: "English".to_string(),
            executable: format!("{app_name}.command"),
            name: app_name.to_string(),
            minimum_system_version: "10.4".to_string(),
            multiple_instances_prohibited: true,
            package_type: "APPL".to_string(),
            version: "0.0".to_string(),
        }
    }
}
