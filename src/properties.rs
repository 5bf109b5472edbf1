use std::{collections::HashMap, fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{HuffError, Result};

/// Settings of a compression or decompression run.
///
/// Passed explicitly to [`HuffProcessor::new`](crate::processor::HuffProcessor::new);
/// nothing about a run is configured through global state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    /// Log the tree, the code table and the bit counts at debug level
    pub debug: bool,
    /// Store the run statistics next to the output file
    pub write_stats: bool,
}

impl Properties {
    /// Reads a Java-style `.properties` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let p = java_properties::read(BufReader::new(file))
            .map_err(|e| HuffError::Config(format!("failed parsing {}: {}", path.display(), e)))?;

        Properties::try_from(p)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" | "" => Ok(false),
        other => Err(HuffError::Config(format!("{} must be a boolean, found '{}'", key, other))),
    }
}

impl TryFrom<HashMap<String, String>> for Properties {
    type Error = HuffError;

    fn try_from(value: HashMap<String, String>) -> Result<Self> {
        let mut props = Properties::default();

        if let Some(debug) = value.get("debug") {
            props.debug = parse_flag("debug", debug)?;
        }
        if let Some(stats) = value.get("stats") {
            props.write_stats = parse_flag("stats", stats)?;
        }

        Ok(props)
    }
}

impl From<Properties> for String {
    fn from(val: Properties) -> Self {
        let mut s = String::new();

        s.push_str("#Huffman processor properties\n");
        s.push_str(&format!("debug={}\n", val.debug));
        s.push_str(&format!("stats={}\n", val.write_stats));

        s
    }
}
