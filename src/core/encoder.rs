use crate::core::dataset::normalize_category;
use crate::core::{CropFeatures, HandleUnknown, NUMERIC_COLUMNS};
use crate::utils::error::{PestError, Result};
use std::collections::BTreeSet;

/// crop_type 做 one-hot，其餘數值欄位原樣接在後面
#[derive(Debug, Clone, Default)]
pub struct FeatureEncoder {
    categories: Vec<String>,
    handle_unknown: HandleUnknown,
}

impl FeatureEncoder {
    pub fn new(handle_unknown: HandleUnknown) -> Self {
        Self {
            categories: Vec::new(),
            handle_unknown,
        }
    }

    pub fn fit<R: CropFeatures>(&mut self, rows: &[R]) -> Result<()> {
        let categories: BTreeSet<String> = rows
            .iter()
            .map(|row| normalize_category(row.crop_type()))
            .collect();

        if categories.is_empty() {
            return Err(PestError::TrainingError {
                message: "cannot fit encoder on an empty dataset".to_string(),
            });
        }

        self.categories = categories.into_iter().collect();
        tracing::debug!("Encoder categories: {:?}", self.categories);
        Ok(())
    }

    pub fn transform<R: CropFeatures>(&self, row: &R) -> Result<Vec<f64>> {
        let crop = normalize_category(row.crop_type());
        let mut features = vec![0.0; self.n_features()];

        match self.categories.binary_search(&crop) {
            Ok(idx) => features[idx] = 1.0,
            Err(_) if self.handle_unknown == HandleUnknown::Ignore => {
                tracing::debug!("Unknown crop '{}' encoded as all zeros", crop);
            }
            Err(_) => {
                return Err(PestError::UnknownCategoryError {
                    column: "crop_type".to_string(),
                    value: row.crop_type().to_string(),
                })
            }
        }

        let offset = self.categories.len();
        for (i, value) in row.numeric_features().into_iter().enumerate() {
            features[offset + i] = value;
        }

        Ok(features)
    }

    pub fn transform_all<R: CropFeatures>(&self, rows: &[R]) -> Result<Vec<Vec<f64>>> {
        rows.iter().map(|row| self.transform(row)).collect()
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn n_features(&self) -> usize {
        self.categories.len() + NUMERIC_COLUMNS.len()
    }

    /// 與 transform 輸出順序一致的欄位名稱
    pub fn feature_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|c| format!("crop_type_{}", c))
            .chain(NUMERIC_COLUMNS.iter().map(|c| c.to_string()))
            .collect()
    }
}
