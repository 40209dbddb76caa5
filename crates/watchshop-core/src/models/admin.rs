//! Edit form for the admin catalog screen.

use std::path::PathBuf;

use reqwest::multipart::{Form, Part};

use crate::api::ApiError;
use crate::utils::is_valid_price;

use super::{Watch, WatchType};

/// Largest image the admin form accepts (5 MiB).
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Image attached to an update.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Read an image from disk, rejecting files over the size limit.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, ApiError> {
        let path = path.into();
        let metadata = std::fs::metadata(&path)
            .map_err(|e| ApiError::Validation(format!("Cannot read {}: {}", path.display(), e)))?;
        if metadata.len() > MAX_IMAGE_BYTES {
            return Err(ApiError::Validation("Image must not exceed 5MB".to_string()));
        }
        let bytes = std::fs::read(&path)
            .map_err(|e| ApiError::Validation(format!("Cannot read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self { file_name, bytes })
    }
}

/// Fields of the watch edit form.
#[derive(Debug, Clone)]
pub struct WatchForm {
    pub id: i64,
    pub name: String,
    pub brand_id: String,
    pub description: String,
    pub price: String,
    pub watch_type: WatchType,
    pub in_stock: bool,
    pub image: Option<ImageUpload>,
}

impl WatchForm {
    /// Prefill the form from an existing watch.
    pub fn from_watch(watch: &Watch) -> Self {
        Self {
            id: watch.id,
            name: watch.name.clone(),
            brand_id: watch.brand.id.to_string(),
            description: watch.description.clone(),
            price: watch.price.clone(),
            watch_type: watch.watch_type,
            in_stock: watch.in_stock,
            image: None,
        }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        let required = [&self.name, &self.brand_id, &self.price];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(ApiError::Validation(
                "Name, brand and price are required".to_string(),
            ));
        }
        if !is_valid_price(&self.price) {
            return Err(ApiError::Validation("Price must be a number".to_string()));
        }
        if let Some(ref image) = self.image {
            if image.bytes.len() as u64 > MAX_IMAGE_BYTES {
                return Err(ApiError::Validation("Image must not exceed 5MB".to_string()));
            }
        }
        Ok(())
    }

    /// Multipart payload for `PUT /api/watches/{id}/`.
    pub fn to_multipart(&self) -> Form {
        let mut form = Form::new()
            .text("name", self.name.clone())
            .text("brand_id", self.brand_id.clone())
            .text("description", self.description.clone())
            .text("price", self.price.clone())
            .text("watch_type", self.watch_type.as_param())
            .text("in_stock", self.in_stock.to_string());
        if let Some(ref image) = self.image {
            form = form.part(
                "image",
                Part::bytes(image.bytes.clone()).file_name(image.file_name.clone()),
            );
        }
        form
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> WatchForm {
        WatchForm {
            id: 1,
            name: "Seamaster".to_string(),
            brand_id: "2".to_string(),
            description: String::new(),
            price: "5200.00".to_string(),
            watch_type: WatchType::Analog,
            in_stock: true,
            image: None,
        }
    }

    #[test]
    fn test_valid_form() {
        assert!(form().validate().is_ok());
    }

    #[test]
    fn test_required_fields() {
        let mut f = form();
        f.name = "  ".to_string();
        assert!(matches!(f.validate(), Err(ApiError::Validation(_))));

        let mut f = form();
        f.brand_id.clear();
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_price_must_be_numeric() {
        let mut f = form();
        f.price = "cheap".to_string();
        let err = f.validate().expect_err("non-numeric price");
        assert_eq!(err.to_string(), "Invalid request: Price must be a number");
    }

    #[test]
    fn test_image_size_limit() {
        let mut f = form();
        f.image = Some(ImageUpload {
            file_name: "big.jpg".to_string(),
            bytes: vec![0; MAX_IMAGE_BYTES as usize + 1],
        });
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_image_from_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("face.png");
        std::fs::write(&path, [1u8, 2, 3]).expect("write image");

        let image = ImageUpload::from_path(&path).expect("small image loads");
        assert_eq!(image.file_name, "face.png");
        assert_eq!(image.bytes, vec![1, 2, 3]);

        assert!(ImageUpload::from_path(dir.path().join("missing.png")).is_err());
    }
}
