use std::cmp::Ordering;

use crate::models::UpdateInfo;
use crate::services::api_client::{decode_lenient, ApiClient};
use crate::services::transport::HttpMethod;
use crate::utils::constants::UPDATE_DISMISSED_STORAGE_KEY;
use crate::utils::storage::KeyValueStorage;

const CHECK_UPDATE_PATH: &str = "/api/check-update";

/// Compara versiones "1.2.3" (con o sin `v`). Segmentos no numéricos valen 0.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    fn parse(v: &str) -> Vec<u64> {
        let v = v.trim();
        let v = if v.is_empty() { "0" } else { v };
        v.strip_prefix('v')
            .unwrap_or(v)
            .split('.')
            .map(|part| {
                let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
                digits.parse().unwrap_or(0)
            })
            .collect()
    }

    let (pa, pb) = (parse(a), parse(b));
    let len = pa.len().max(pb.len());
    (0..len)
        .map(|i| {
            let na = pa.get(i).copied().unwrap_or(0);
            let nb = pb.get(i).copied().unwrap_or(0);
            na.cmp(&nb)
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Hay que mostrar el aviso para esta versión
pub fn should_show(info: &UpdateInfo, current_version: &str, dismissed_tag: Option<&str>) -> bool {
    if !info.has_update {
        return false;
    }
    let Some(version) = info.version.as_deref().filter(|v| !v.is_empty()) else {
        return false;
    };
    if compare_versions(version, current_version) != Ordering::Greater {
        return false;
    }
    match (dismissed_tag, info.tag_name.as_deref()) {
        (Some(dismissed), Some(tag)) => dismissed != tag,
        _ => true,
    }
}

#[derive(Clone)]
pub struct UpdateService {
    api: ApiClient,
}

impl UpdateService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Sin auth ni scope. Cualquier fallo se trata como "sin novedad".
    pub async fn check_update(&self) -> Option<UpdateInfo> {
        match self.api.call(CHECK_UPDATE_PATH, HttpMethod::Get, None, None, None).await {
            Ok(data) => Some(decode_lenient(CHECK_UPDATE_PATH, data)),
            Err(e) => {
                log::debug!("🔄 check-update falló: {}", e);
                None
            }
        }
    }
}

pub fn dismissed_tag(storage: &dyn KeyValueStorage) -> Option<String> {
    storage
        .get_item(UPDATE_DISMISSED_STORAGE_KEY)
        .filter(|tag| !tag.is_empty())
}

pub fn dismiss(storage: &dyn KeyValueStorage, tag_name: &str) -> Result<(), String> {
    storage.set_item(UPDATE_DISMISSED_STORAGE_KEY, tag_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.2.0", "1.1.9", Ordering::Greater)]
    #[case("v1.0.0", "1.0.0", Ordering::Equal)]
    #[case("1.0", "1.0.1", Ordering::Less)]
    #[case("2.0.0-beta", "1.9.9", Ordering::Greater)]
    #[case("", "0.0.0", Ordering::Equal)]
    fn compares_versions_numerically(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(compare_versions(a, b), expected);
    }

    fn info(version: &str, tag: &str) -> UpdateInfo {
        UpdateInfo {
            has_update: true,
            version: Some(version.into()),
            tag_name: Some(tag.into()),
            ..Default::default()
        }
    }

    #[test]
    fn shows_only_newer_undismissed_versions() {
        assert!(should_show(&info("1.2.0", "v1.2.0"), "1.1.0", None));
        assert!(!should_show(&info("1.1.0", "v1.1.0"), "1.1.0", None));
        assert!(!should_show(&info("1.2.0", "v1.2.0"), "1.1.0", Some("v1.2.0")));
        assert!(should_show(&info("1.3.0", "v1.3.0"), "1.1.0", Some("v1.2.0")));
        assert!(!should_show(&UpdateInfo::default(), "0.0.1", None));
    }
}
