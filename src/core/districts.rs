use crate::domain::model::DistrictRecord;
use crate::utils::error::Result;
use csv::StringRecord;
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// 啟動時載入一次的地區資料，之後只讀
#[derive(Debug, Clone, Default)]
pub struct DistrictCatalog {
    records: Vec<DistrictRecord>,
}

impl DistrictCatalog {
    /// 從 CSV 檔案載入，第一列為欄位名稱
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading district data from {}", path.display());
        let file = std::fs::File::open(path)?;
        let catalog = Self::from_reader(file)?;
        tracing::info!(
            "Loaded {} district records from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let columns = dedupe_headers(csv_reader.headers()?);
        let rows = csv_reader
            .records()
            .collect::<std::result::Result<Vec<StringRecord>, csv::Error>>()?;

        // 型別以整欄決定，同一欄在每一列的型別一致
        let kinds: Vec<ColumnKind> = (0..columns.len())
            .map(|i| ColumnKind::infer(rows.iter().filter_map(|row| row.get(i))))
            .collect();

        let records = rows
            .iter()
            .map(|row| {
                let mut data = Map::with_capacity(columns.len());
                for ((column, kind), cell) in columns.iter().zip(&kinds).zip(row.iter()) {
                    data.insert(column.clone(), kind.convert(cell));
                }
                DistrictRecord::new(data)
            })
            .collect();

        Ok(Self { records })
    }

    pub fn records(&self) -> &[DistrictRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// 重複的欄位名稱加上 `.1`、`.2` 後綴，避免後面的欄位蓋掉前面的。
/// 改名後若仍與既有欄位相撞，繼續在新名稱後面加後綴（`Crop.1` -> `Crop.1.1`）。
fn dedupe_headers(headers: &StringRecord) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::with_capacity(headers.len());
    let mut columns = Vec::with_capacity(headers.len());

    for header in headers.iter() {
        let mut name = header.to_string();
        let mut count = counts.get(&name).copied().unwrap_or(0);
        while count > 0 {
            counts.insert(name.clone(), count + 1);
            name = format!("{}.{}", name, count);
            count = counts.get(&name).copied().unwrap_or(0);
        }
        if name != header {
            tracing::warn!("Duplicate column '{}' renamed to '{}'", header, name);
        }
        counts.insert(name.clone(), count + 1);
        columns.push(name);
    }

    columns
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Integer,
    Float,
    Boolean,
    Text,
}

impl ColumnKind {
    /// 空白儲存格不參與判斷；整欄皆空時視為文字
    fn infer<'a>(cells: impl Iterator<Item = &'a str>) -> Self {
        let mut integer = true;
        let mut float = true;
        let mut boolean = true;
        let mut any = false;

        for cell in cells.map(str::trim).filter(|c| !c.is_empty()) {
            any = true;
            integer &= cell.parse::<i64>().is_ok();
            // NaN / inf 無法表示成 JSON 數字
            float &= cell.parse::<f64>().is_ok_and(f64::is_finite);
            boolean &= parse_bool(cell).is_some();
            if !(integer || float || boolean) {
                return Self::Text;
            }
        }

        match (any, integer, float, boolean) {
            (false, ..) => Self::Text,
            (_, true, _, _) => Self::Integer,
            (_, _, true, _) => Self::Float,
            (_, _, _, true) => Self::Boolean,
            _ => Self::Text,
        }
    }

    fn convert(self, cell: &str) -> Value {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }

        let converted = match self {
            Self::Integer => trimmed.parse::<i64>().ok().map(Value::from),
            Self::Float => trimmed
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            Self::Boolean => parse_bool(trimmed).map(Value::Bool),
            Self::Text => None,
        };

        converted.unwrap_or_else(|| Value::String(cell.to_string()))
    }
}

fn parse_bool(cell: &str) -> Option<bool> {
    if cell.eq_ignore_ascii_case("true") {
        Some(true)
    } else if cell.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
