use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use strum::{Display, EnumString};

/// Config key of the login page background
pub const LOGIN_BACKGROUND_KEY: &str = "LOGIN_BACKGROUND";

/// Largest decoded background image accepted
pub const MAX_BACKGROUND_IMAGE_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ImageFit {
    Fill,
    Tile,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginBackground {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_fit: Option<ImageFit>,
}

/// Public application configuration read by the login page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationConfig {
    #[serde(rename = "LOGIN_BACKGROUND", default, skip_serializing_if = "Option::is_none")]
    pub login_background: Option<LoginBackground>,
}

fn hex_color_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#?([0-9a-fA-F]{6})$").expect("valid regex"))
}

impl LoginBackground {
    /// Validate and normalize the background; the colour is stored without `#`
    pub fn normalized(self) -> Result<Self, String> {
        let background_color = match self.background_color {
            Some(color) => {
                let caps = hex_color_regex()
                    .captures(color.trim())
                    .ok_or_else(|| format!("Invalid background colour: {}", color))?;
                Some(caps[1].to_uppercase())
            }
            None => None,
        };

        if let Some(image) = &self.background_image {
            let size = decoded_image_size(image)?;
            if size > MAX_BACKGROUND_IMAGE_BYTES {
                return Err(format!(
                    "Background image is too large ({} bytes, max {})",
                    size, MAX_BACKGROUND_IMAGE_BYTES
                ));
            }
        }

        if background_color.is_none() && self.background_image.is_none() {
            return Err("Either backgroundColor or backgroundImage is required".to_string());
        }

        Ok(Self {
            background_color,
            background_image: self.background_image,
            image_fit: self.image_fit,
        })
    }
}

/// Size in bytes of a `data:image/...;base64,` payload
fn decoded_image_size(data_url: &str) -> Result<usize, String> {
    let rest = data_url
        .strip_prefix("data:image/")
        .ok_or_else(|| "Background image must be a data:image URL".to_string())?;
    let (_, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| "Background image must be base64 encoded".to_string())?;
    STANDARD
        .decode(payload)
        .map(|bytes| bytes.len())
        .map_err(|e| format!("Invalid background image encoding: {}", e))
}
