//! Code for reading district configuration from a CSV file.
use super::*;
use crate::district::{DistrictConfig, DistrictMap};

const DISTRICTS_FILE_NAME: &str = "districts.csv";

/// Reads districts from a CSV file.
///
/// # Arguments
///
/// * `dashboard_dir` - Folder containing dashboard configuration files
///
/// # Returns
///
/// A [`DistrictMap`] with the parsed and validated districts or an error
pub fn read_districts(dashboard_dir: &Path) -> Result<DistrictMap> {
    let file_path = dashboard_dir.join(DISTRICTS_FILE_NAME);
    let districts = read_csv_keyed(&file_path, |district: &DistrictConfig| district.id.clone())?;
    for district in districts.values() {
        district
            .validate()
            .with_context(|| input_err_msg(&file_path))?;
    }

    Ok(districts)
}
