use crate::error::{AppError, Result};
use crate::models::{CaseStatus, CaseType, ComplianceCase};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory store for compliance cases.
#[derive(Debug, Default)]
pub struct CaseRepository {
    cases: RwLock<HashMap<Uuid, ComplianceCase>>,
}

impl CaseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, case: ComplianceCase) -> ComplianceCase {
        self.cases.write().await.insert(case.id, case.clone());
        case
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ComplianceCase>> {
        Ok(self.cases.read().await.get(&id).cloned())
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Vec<ComplianceCase> {
        self.cases
            .read()
            .await
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn list_by_type(&self, case_type: CaseType) -> Vec<ComplianceCase> {
        self.cases
            .read()
            .await
            .values()
            .filter(|c| c.case_type == case_type)
            .cloned()
            .collect()
    }

    pub async fn open_cases(&self) -> Vec<ComplianceCase> {
        self.cases
            .read()
            .await
            .values()
            .filter(|c| c.status == CaseStatus::Pending)
            .cloned()
            .collect()
    }

    /// Persists a reviewed case (the human-review hook).
    pub async fn update(&self, case: &ComplianceCase) -> Result<ComplianceCase> {
        let mut cases = self.cases.write().await;
        if !cases.contains_key(&case.id) {
            return Err(AppError::NotFound(format!("compliance case '{}'", case.id)));
        }
        cases.insert(case.id, case.clone());
        Ok(case.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CaseSeverity;

    #[tokio::test]
    async fn test_create_and_query() {
        let repo = CaseRepository::new();
        let user = Uuid::new_v4();
        repo.create(ComplianceCase::new(
            user,
            CaseType::Structuring,
            CaseSeverity::High,
            "structured deposits",
        ))
        .await;
        repo.create(ComplianceCase::new(
            user,
            CaseType::UnusualPattern,
            CaseSeverity::Low,
            "night-time activity",
        ))
        .await;

        assert_eq!(repo.list_for_user(user).await.len(), 2);
        assert_eq!(repo.list_by_type(CaseType::Structuring).await.len(), 1);
        assert_eq!(repo.open_cases().await.len(), 2);
    }

    #[tokio::test]
    async fn test_review_persists() {
        let repo = CaseRepository::new();
        let mut case = repo
            .create(ComplianceCase::new(
                Uuid::new_v4(),
                CaseType::HighRiskScore,
                CaseSeverity::Critical,
                "critical score",
            ))
            .await;

        case.review(Uuid::new_v4(), CaseStatus::Referred, None);
        repo.update(&case).await.unwrap();

        let stored = repo.find_by_id(case.id).await.unwrap().unwrap();
        assert_eq!(stored.status, CaseStatus::Referred);
        assert!(repo.open_cases().await.is_empty());
    }
}
