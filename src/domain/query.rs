use serde::{Deserialize, Serialize};

use crate::infrastructure::error::{AppError, AppResult};

/// Ordre de tri pour les listes paginées
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    10
}

fn default_sort() -> String {
    "created_at".to_string()
}

/// Paramètres de requête pour les listes paginées avec recherche
#[derive(Debug, Clone, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default)]
    pub search: String,
    #[serde(default = "default_sort")]
    pub sort: String,
    #[serde(default)]
    pub order: SortOrder,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
            search: String::new(),
            sort: default_sort(),
            order: SortOrder::default(),
        }
    }
}

impl ListParams {
    /// Taille de page, jamais nulle
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page.max(1))
    }

    /// Décalage SQL calculé depuis la page (1-indexée)
    pub fn offset(&self) -> i64 {
        i64::from(self.page.max(1) - 1) * self.limit()
    }

    /// Colonne de tri validée contre la liste blanche
    ///
    /// Les noms camelCase des clients historiques sont acceptés.
    pub fn sort_column(&self) -> AppResult<&'static str> {
        match self.sort.as_str() {
            "created_at" | "createdAt" => Ok("created_at"),
            "updated_at" | "updatedAt" => Ok("updated_at"),
            "name" => Ok("name"),
            "email" => Ok("email"),
            other => Err(AppError::BadRequest(format!(
                "Colonne de tri inconnue: {other}"
            ))),
        }
    }
}

/// Métadonnées de pagination renvoyées avec chaque liste
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: i64,
}

impl PageMeta {
    pub fn new(total: i64, params: &ListParams) -> Self {
        let per_page = params.limit();
        Self {
            total,
            page: params.page.max(1),
            per_page: per_page as u32,
            total_pages: (total + per_page - 1) / per_page,
        }
    }
}

/// Une page de résultats avec ses métadonnées
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: u32, per_page: u32) -> ListParams {
        ListParams {
            page,
            per_page,
            ..ListParams::default()
        }
    }

    #[test]
    fn defaults_match_api_contract() {
        let p: ListParams = serde_json::from_str("{}").unwrap();
        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, 10);
        assert_eq!(p.search, "");
        assert_eq!(p.sort, "created_at");
        assert_eq!(p.order, SortOrder::Asc);
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(params(1, 10).offset(), 0);
        assert_eq!(params(3, 10).offset(), 20);
        assert_eq!(params(2, 25).offset(), 25);
    }

    #[test]
    fn degenerate_page_and_per_page_are_clamped() {
        assert_eq!(params(0, 10).offset(), 0);
        assert_eq!(params(1, 0).limit(), 1);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(PageMeta::new(0, &params(1, 10)).total_pages, 0);
        assert_eq!(PageMeta::new(10, &params(1, 10)).total_pages, 1);
        assert_eq!(PageMeta::new(11, &params(1, 10)).total_pages, 2);
        assert_eq!(PageMeta::new(9, &params(1, 10)).total_pages, 1);
    }

    #[test]
    fn sort_column_whitelist() {
        let mut p = ListParams::default();
        assert_eq!(p.sort_column().unwrap(), "created_at");

        p.sort = "createdAt".to_string();
        assert_eq!(p.sort_column().unwrap(), "created_at");

        p.sort = "email".to_string();
        assert_eq!(p.sort_column().unwrap(), "email");

        p.sort = "password_hash".to_string();
        assert!(p.sort_column().is_err());

        p.sort = "name; DROP TABLE users".to_string();
        assert!(p.sort_column().is_err());
    }

    #[test]
    fn sort_order_sql_fragment() {
        assert_eq!(SortOrder::Asc.as_sql(), "ASC");
        assert_eq!(SortOrder::Desc.as_sql(), "DESC");
    }

    #[test]
    fn order_deserializes_lowercase() {
        let p: ListParams = serde_json::from_str(r#"{"order":"desc"}"#).unwrap();
        assert_eq!(p.order, SortOrder::Desc);
    }
}
