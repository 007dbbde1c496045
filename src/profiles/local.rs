//! In-memory profile table

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ProfileError, ProfileSource};
use crate::domain::{seed, StudentProfile};

/// Profiles held in process memory
pub struct LocalProfiles {
    rows: RwLock<Vec<StudentProfile>>,
}

impl LocalProfiles {
    pub fn new(rows: Vec<StudentProfile>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// Seeded with the mock profiles
    pub fn seeded() -> Self {
        Self::new(seed::mock_profiles())
    }
}

#[async_trait]
impl ProfileSource for LocalProfiles {
    fn backend(&self) -> &'static str {
        "local"
    }

    async fn list(&self) -> Result<Vec<StudentProfile>, ProfileError> {
        let mut rows = self.rows.read().await.clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn delete(&self, id: &str) -> Result<(), ProfileError> {
        let mut rows = self.rows.write().await;
        let index = rows
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| ProfileError::NotFound(id.to_string()))?;
        rows.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_sorted_by_name() {
        let profiles = LocalProfiles::seeded();
        let rows = profiles.list().await.unwrap();
        let names: Vec<_> = rows.iter().map(|p| p.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[tokio::test]
    async fn test_delete_removes_only_match() {
        let profiles = LocalProfiles::seeded();
        let before = profiles.list().await.unwrap();

        profiles.delete("STU003").await.unwrap();
        let after = profiles.list().await.unwrap();

        let expected: Vec<_> = before.into_iter().filter(|p| p.id != "STU003").collect();
        assert_eq!(after, expected);

        assert!(matches!(
            profiles.delete("STU003").await,
            Err(ProfileError::NotFound(_))
        ));
    }
}
