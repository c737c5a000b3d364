use crate::core::WeatherObservation;
use crate::utils::error::{PestError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<WeatherObservation>,
}

impl Dataset {
    pub fn new(rows: Vec<WeatherObservation>) -> Self {
        Self { rows }
    }

    /// 解析 CSV 內容；log_id、date 只保留不進模型
    pub fn from_csv_bytes(data: &[u8]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(data);

        let mut rows = Vec::new();
        for (line, result) in reader.deserialize::<WeatherObservation>().enumerate() {
            let mut row = result?;
            if row.pest_infestation > 1 {
                return Err(PestError::DatasetError {
                    message: format!(
                        "row {}: pest_infestation must be 0 or 1, got {}",
                        line + 1,
                        row.pest_infestation
                    ),
                });
            }
            row.crop_type = normalize_category(&row.crop_type);
            if row.crop_type.is_empty() {
                return Err(PestError::DatasetError {
                    message: format!("row {}: crop_type is empty", line + 1),
                });
            }
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(PestError::DatasetError {
                message: "dataset contains no rows".to_string(),
            });
        }

        tracing::debug!("Parsed {} observations", rows.len());
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[WeatherObservation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn targets(&self) -> Vec<usize> {
        self.rows
            .iter()
            .map(|row| row.pest_infestation as usize)
            .collect()
    }

    /// test_size >= 1 代表保留的列數，(0, 1) 代表比例
    pub fn split(&self, test_size: f64, seed: u64) -> Result<(Dataset, Dataset)> {
        let n = self.rows.len();
        let n_test = if test_size >= 1.0 {
            test_size as usize
        } else if test_size > 0.0 {
            (test_size * n as f64).ceil() as usize
        } else {
            0
        };

        if n_test >= n {
            return Err(PestError::DatasetError {
                message: format!(
                    "test_size {} leaves no training rows out of {}",
                    test_size, n
                ),
            });
        }

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let (test_idx, train_idx) = indices.split_at(n_test);
        let pick = |idx: &[usize]| Dataset::new(idx.iter().map(|&i| self.rows[i].clone()).collect());

        Ok((pick(train_idx), pick(test_idx)))
    }
}

/// 類別值一律去除空白並轉小寫
pub fn normalize_category(value: &str) -> String {
    value.trim().to_lowercase()
}
