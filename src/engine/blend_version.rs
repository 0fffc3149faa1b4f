// ==========================================
// 棉花混配质量报表系统 - 配方版本解析
// ==========================================
// 职责: 配方代码 → 基础签名 (group_key) + 版本号
// 规则 (按顺序):
//   1. 空/缺失 → "__NO_VERSION__", 无版本号
//   2. <2位>_<2位>_V<数字> → "<2位>_<2位>", 版本号
//   3. 末尾 V<数字> (前可带空格/-/_/ 分隔) → 去分隔的前缀, 版本号
//   4. 其他 → 整串 (去空白 + 大写), 无版本号
// 用途: 同一配方的历次修订归入同一连续性分组
// ==========================================

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// 无配方代码时的分组键
pub const NO_VERSION_KEY: &str = "__NO_VERSION__";

static PAIRED_VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d{2})_(\d{2})_V(\d+)$").expect("valid paired version pattern"));

static TRAILING_VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.*?)[\s\-_/]*V(\d+)$").expect("valid trailing version pattern"));

static VERSION_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)V\d+$").expect("valid version marker pattern"));

const SEPARATORS: &[char] = &[' ', '\t', '-', '_', '/'];

// ==========================================
// BlendVersion - 解析结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlendVersion {
    /// 配方签名 (同一配方的各版本相同)
    pub group_key: String,

    /// 版本号
    pub version_number: Option<i64>,

    /// 规范化原始代码 (去空白 + 大写)
    pub normalized_raw: String,
}

// ==========================================
// BlendVersionParser - 配方版本解析器
// ==========================================
pub struct BlendVersionParser;

impl BlendVersionParser {
    /// 解析配方代码
    pub fn parse(raw: Option<&str>) -> BlendVersion {
        let normalized = raw.map(|s| s.trim().to_uppercase()).unwrap_or_default();

        if normalized.is_empty() {
            return BlendVersion {
                group_key: NO_VERSION_KEY.to_string(),
                version_number: None,
                normalized_raw: normalized,
            };
        }

        if let Some(caps) = PAIRED_VERSION_RE.captures(&normalized) {
            return BlendVersion {
                group_key: format!("{}_{}", &caps[1], &caps[2]),
                version_number: caps[3].parse().ok(),
                normalized_raw: normalized,
            };
        }

        if let Some(caps) = TRAILING_VERSION_RE.captures(&normalized) {
            let prefix = caps[1].trim_end_matches(SEPARATORS).trim();
            let group_key = if prefix.is_empty() {
                let stripped = VERSION_MARKER_RE.replace(&normalized, "");
                let stripped = stripped.trim_matches(SEPARATORS);
                if stripped.is_empty() {
                    NO_VERSION_KEY.to_string()
                } else {
                    stripped.to_string()
                }
            } else {
                prefix.to_string()
            };
            return BlendVersion {
                group_key,
                version_number: caps[2].parse().ok(),
                normalized_raw: normalized,
            };
        }

        BlendVersion {
            group_key: normalized.clone(),
            version_number: None,
            normalized_raw: normalized,
        }
    }
}
