//! In-memory implementation of the store traits.
//!
//! Mirrors the PostgreSQL schema: identities come from per-table
//! sequences, uuids are unique per table, deleting a project cascades to
//! its scans, and scan components are kept as a set of component
//! identities so reads come back in ascending identity order.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use scantrack_core::error::AppError;
use scantrack_core::result::AppResult;
use scantrack_core::types::pagination::{PageRequest, PageResponse};
use scantrack_core::types::{ComponentUuid, ProjectUuid, ScanUuid};
use scantrack_entity::component::{Component, CreateComponent};
use scantrack_entity::project::{CreateProject, Project, UpdateProject};
use scantrack_entity::scan::{CreateScan, Scan, ScanRecord};

use crate::store::{ComponentStore, ProjectStore, ScanStore};

#[derive(Debug, Default)]
struct State {
    next_project_id: i64,
    next_component_id: i64,
    next_scan_id: i64,
    projects: BTreeMap<i64, Project>,
    components: BTreeMap<i64, Component>,
    scans: BTreeMap<i64, Scan>,
    links: BTreeMap<i64, BTreeSet<i64>>,
}

impl State {
    fn project_by_uuid(&self, uuid: &ProjectUuid) -> Option<&Project> {
        self.projects.values().find(|p| &p.uuid == uuid)
    }

    fn require_project(&self, uuid: &ProjectUuid) -> AppResult<&Project> {
        self.project_by_uuid(uuid)
            .ok_or_else(|| AppError::not_found(format!("Project {uuid} not found")))
    }

    fn scan_id(&self, uuid: &ScanUuid) -> Option<i64> {
        self.scans.values().find(|s| &s.uuid == uuid).map(|s| s.id)
    }

    fn require_scan_id(&self, uuid: &ScanUuid) -> AppResult<i64> {
        self.scan_id(uuid)
            .ok_or_else(|| AppError::not_found(format!("Scan {uuid} not found")))
    }

    fn component_ids(&self, uuids: &[ComponentUuid], strict: bool) -> AppResult<Vec<i64>> {
        let mut ids = Vec::with_capacity(uuids.len());
        for uuid in uuids {
            match self.components.values().find(|c| &c.uuid == uuid) {
                Some(component) => ids.push(component.id),
                None if strict => {
                    return Err(AppError::not_found(format!("Component {uuid} not found")));
                }
                None => {}
            }
        }
        Ok(ids)
    }

    fn record(&self, scan_id: i64) -> AppResult<ScanRecord> {
        let scan = self
            .scans
            .get(&scan_id)
            .cloned()
            .ok_or_else(|| AppError::internal(format!("Scan row {scan_id} vanished")))?;
        let project = self
            .projects
            .get(&scan.project_id)
            .cloned()
            .ok_or_else(|| AppError::internal(format!("Project row {} vanished", scan.project_id)))?;
        let components = self
            .links
            .get(&scan_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.components.get(id).cloned())
            .collect();
        Ok(ScanRecord::from_parts(scan, project, components))
    }

    fn remove_scan(&mut self, scan_id: i64) {
        self.scans.remove(&scan_id);
        self.links.remove(&scan_id);
    }
}

/// Store keeping every table in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn create_project(&self, data: &CreateProject) -> AppResult<Project> {
        let mut state = self.state.write().await;
        state.next_project_id += 1;
        let project = Project {
            id: state.next_project_id,
            uuid: ProjectUuid::new(),
            name: data.name.clone(),
            version: data.version.clone(),
            description: data.description.clone(),
        };
        state.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn find_project(&self, uuid: &ProjectUuid) -> AppResult<Option<Project>> {
        Ok(self.state.read().await.project_by_uuid(uuid).cloned())
    }

    async fn list_projects(&self, page: &PageRequest) -> AppResult<PageResponse<Project>> {
        let state = self.state.read().await;
        let mut projects: Vec<Project> = state.projects.values().cloned().collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        let total = projects.len() as u64;
        let items = projects
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit()).unwrap_or(usize::MAX))
            .collect();
        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    async fn update_project(
        &self,
        uuid: &ProjectUuid,
        data: &UpdateProject,
    ) -> AppResult<Option<Project>> {
        let mut state = self.state.write().await;
        let Some(project) = state.projects.values_mut().find(|p| &p.uuid == uuid) else {
            return Ok(None);
        };
        data.apply(project);
        Ok(Some(project.clone()))
    }

    async fn delete_project(&self, uuid: &ProjectUuid) -> AppResult<Option<u64>> {
        let mut state = self.state.write().await;
        let Some(project_id) = state.project_by_uuid(uuid).map(|p| p.id) else {
            return Ok(None);
        };
        let owned: Vec<i64> = state
            .scans
            .values()
            .filter(|s| s.project_id == project_id)
            .map(|s| s.id)
            .collect();
        for scan_id in &owned {
            state.remove_scan(*scan_id);
        }
        state.projects.remove(&project_id);
        info!(project = %uuid, scans = owned.len(), "Deleted project and its scans");
        Ok(Some(owned.len() as u64))
    }
}

#[async_trait]
impl ComponentStore for MemoryStore {
    async fn create_component(&self, data: &CreateComponent) -> AppResult<Component> {
        let mut state = self.state.write().await;
        state.next_component_id += 1;
        let component = Component {
            id: state.next_component_id,
            uuid: ComponentUuid::new(),
            group: data.group.clone(),
            name: data.name.clone(),
            version: data.version.clone(),
            purl: data.purl.clone(),
        };
        state.components.insert(component.id, component.clone());
        Ok(component)
    }

    async fn find_component(&self, uuid: &ComponentUuid) -> AppResult<Option<Component>> {
        let state = self.state.read().await;
        Ok(state.components.values().find(|c| &c.uuid == uuid).cloned())
    }
}

#[async_trait]
impl ScanStore for MemoryStore {
    async fn create(&self, data: &CreateScan) -> AppResult<ScanRecord> {
        let mut state = self.state.write().await;

        let project = state.require_project(&data.project)?.clone();
        let component_ids = state.component_ids(&data.components, true)?;
        if state.scan_id(&data.uuid).is_some() {
            return Err(AppError::conflict(format!("Scan {} already exists", data.uuid)));
        }

        let components = component_ids
            .iter()
            .filter_map(|id| state.components.get(id).cloned())
            .collect();
        let mut record = ScanRecord::new(
            data.uuid,
            data.executed,
            data.imported,
            project.clone(),
            components,
        );

        state.next_scan_id += 1;
        let id = state.next_scan_id;
        record.assign_id(id)?;

        state.scans.insert(
            id,
            Scan {
                id,
                uuid: data.uuid,
                executed: data.executed,
                imported: data.imported,
                project_id: project.id,
            },
        );
        state.links.insert(id, component_ids.into_iter().collect());

        debug!(scan = %data.uuid, id, "Stored scan in memory");
        Ok(record)
    }

    async fn find_by_uuid(&self, uuid: &ScanUuid) -> AppResult<Option<ScanRecord>> {
        let state = self.state.read().await;
        state.scan_id(uuid).map(|id| state.record(id)).transpose()
    }

    async fn find_by_project(
        &self,
        project: &ProjectUuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ScanRecord>> {
        let state = self.state.read().await;
        let owner_id = state.require_project(project)?.id;

        let mut owned: Vec<&Scan> = state
            .scans
            .values()
            .filter(|s| s.project_id == owner_id)
            .collect();
        owned.sort_by(|a, b| b.imported.cmp(&a.imported).then(b.id.cmp(&a.id)));
        let total = owned.len() as u64;

        let items = owned
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit()).unwrap_or(usize::MAX))
            .map(|s| state.record(s.id))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    async fn count_by_project(&self, project: &ProjectUuid) -> AppResult<u64> {
        let state = self.state.read().await;
        let owner_id = state.require_project(project)?.id;
        Ok(state.scans.values().filter(|s| s.project_id == owner_id).count() as u64)
    }

    async fn add_components(
        &self,
        scan: &ScanUuid,
        components: &[ComponentUuid],
    ) -> AppResult<ScanRecord> {
        let mut state = self.state.write().await;
        let scan_id = state.require_scan_id(scan)?;
        let ids = state.component_ids(components, true)?;
        state.links.entry(scan_id).or_default().extend(ids);
        state.record(scan_id)
    }

    async fn remove_components(
        &self,
        scan: &ScanUuid,
        components: &[ComponentUuid],
    ) -> AppResult<ScanRecord> {
        let mut state = self.state.write().await;
        let scan_id = state.require_scan_id(scan)?;
        let ids = state.component_ids(components, false)?;
        if let Some(linked) = state.links.get_mut(&scan_id) {
            for id in ids {
                linked.remove(&id);
            }
        }
        state.record(scan_id)
    }

    async fn replace_components(
        &self,
        scan: &ScanUuid,
        components: &[ComponentUuid],
    ) -> AppResult<ScanRecord> {
        let mut state = self.state.write().await;
        let scan_id = state.require_scan_id(scan)?;
        let ids = state.component_ids(components, true)?;
        state.links.insert(scan_id, ids.into_iter().collect());
        state.record(scan_id)
    }

    async fn delete(&self, uuid: &ScanUuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        match state.scan_id(uuid) {
            Some(id) => {
                state.remove_scan(id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_project(&self, project: &ProjectUuid) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let owner_id = state.require_project(project)?.id;
        let owned: Vec<i64> = state
            .scans
            .values()
            .filter(|s| s.project_id == owner_id)
            .map(|s| s.id)
            .collect();
        for id in &owned {
            state.remove_scan(*id);
        }
        Ok(owned.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use scantrack_core::error::ErrorKind;

    async fn seed_project(store: &MemoryStore) -> Project {
        store
            .create_project(&CreateProject {
                name: "payments".to_string(),
                version: Some("4.1".to_string()),
                description: None,
            })
            .await
            .unwrap()
    }

    async fn seed_component(store: &MemoryStore, name: &str) -> Component {
        store
            .create_component(&CreateComponent {
                group: Some("com.example".to_string()),
                name: name.to_string(),
                version: Some("1.0".to_string()),
                purl: None,
            })
            .await
            .unwrap()
    }

    fn create_scan(project: &Project, components: Vec<ComponentUuid>) -> CreateScan {
        let executed = Utc.with_ymd_and_hms(2024, 2, 10, 9, 0, 0).unwrap();
        CreateScan {
            uuid: ScanUuid::new(),
            executed,
            imported: executed + Duration::minutes(1),
            project: project.uuid,
            components,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_identity() {
        let store = MemoryStore::new();
        let project = seed_project(&store).await;
        let first = store.create(&create_scan(&project, Vec::new())).await.unwrap();
        let second = store.create(&create_scan(&project, Vec::new())).await.unwrap();
        assert_eq!(first.id(), 1);
        assert_eq!(second.id(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_uuid_conflicts() {
        let store = MemoryStore::new();
        let project = seed_project(&store).await;
        let data = create_scan(&project, Vec::new());
        store.create(&data).await.unwrap();

        let err = store.create(&data).await.unwrap_err();
        assert!(err.is_kind(ErrorKind::Conflict));
        assert_eq!(store.count_by_project(&project.uuid).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_project_is_rejected() {
        let store = MemoryStore::new();
        let orphan = Project {
            id: 0,
            uuid: ProjectUuid::new(),
            name: "ghost".to_string(),
            version: None,
            description: None,
        };
        let err = store.create(&create_scan(&orphan, Vec::new())).await.unwrap_err();
        assert!(err.is_kind(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_unknown_component_is_rejected() {
        let store = MemoryStore::new();
        let project = seed_project(&store).await;
        let err = store
            .create(&create_scan(&project, vec![ComponentUuid::new()]))
            .await
            .unwrap_err();
        assert!(err.is_kind(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_components_ordered_by_identity() {
        let store = MemoryStore::new();
        let project = seed_project(&store).await;
        let c1 = seed_component(&store, "alpha").await;
        let c2 = seed_component(&store, "beta").await;
        let c3 = seed_component(&store, "gamma").await;

        let created = store
            .create(&create_scan(&project, vec![c3.uuid, c1.uuid, c2.uuid]))
            .await
            .unwrap();
        let loaded = store.find_by_uuid(&created.uuid()).await.unwrap().unwrap();
        assert_eq!(loaded.components(), &[c1, c2, c3]);
    }

    #[tokio::test]
    async fn test_add_remove_replace_components() {
        let store = MemoryStore::new();
        let project = seed_project(&store).await;
        let c1 = seed_component(&store, "alpha").await;
        let c2 = seed_component(&store, "beta").await;
        let c3 = seed_component(&store, "gamma").await;
        let scan = store
            .create(&create_scan(&project, vec![c2.uuid]))
            .await
            .unwrap()
            .uuid();

        let added = store.add_components(&scan, &[c3.uuid, c1.uuid, c2.uuid]).await.unwrap();
        let ids: Vec<i64> = added.components().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![c1.id, c2.id, c3.id]);

        let removed = store
            .remove_components(&scan, &[c2.uuid, ComponentUuid::new()])
            .await
            .unwrap();
        assert!(!removed.contains_component(&c2.uuid));
        assert_eq!(removed.components().len(), 2);

        let replaced = store.replace_components(&scan, &[c2.uuid]).await.unwrap();
        assert_eq!(replaced.components(), &[c2]);
    }

    #[tokio::test]
    async fn test_find_by_project_newest_import_first() {
        let store = MemoryStore::new();
        let project = seed_project(&store).await;
        let mut older = create_scan(&project, Vec::new());
        older.imported -= Duration::days(1);
        let newer = create_scan(&project, Vec::new());
        store.create(&older).await.unwrap();
        store.create(&newer).await.unwrap();

        let page = store
            .find_by_project(&project.uuid, &PageRequest::new(1, 10))
            .await
            .unwrap();
        assert_eq!(page.total_items, 2);
        assert_eq!(page.items[0].uuid(), newer.uuid);
        assert_eq!(page.items[1].uuid(), older.uuid);
    }

    #[tokio::test]
    async fn test_delete_project_cascades() {
        let store = MemoryStore::new();
        let project = seed_project(&store).await;
        let scan = store.create(&create_scan(&project, Vec::new())).await.unwrap();

        assert_eq!(store.delete_project(&project.uuid).await.unwrap(), Some(1));
        assert!(store.find_by_uuid(&scan.uuid()).await.unwrap().is_none());
        assert_eq!(store.delete_project(&project.uuid).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_scan() {
        let store = MemoryStore::new();
        let project = seed_project(&store).await;
        let scan = store.create(&create_scan(&project, Vec::new())).await.unwrap();

        assert!(store.delete(&scan.uuid()).await.unwrap());
        assert!(!store.delete(&scan.uuid()).await.unwrap());
        assert_eq!(store.delete_by_project(&project.uuid).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_by_project_keeps_project() {
        let store = MemoryStore::new();
        let project = seed_project(&store).await;
        let other = seed_project(&store).await;
        store.create(&create_scan(&project, Vec::new())).await.unwrap();
        store.create(&create_scan(&project, Vec::new())).await.unwrap();
        store.create(&create_scan(&other, Vec::new())).await.unwrap();

        assert_eq!(store.count_by_project(&project.uuid).await.unwrap(), 2);
        assert_eq!(store.delete_by_project(&project.uuid).await.unwrap(), 2);
        assert_eq!(store.count_by_project(&project.uuid).await.unwrap(), 0);
        assert_eq!(store.count_by_project(&other.uuid).await.unwrap(), 1);
        assert!(store.find_project(&project.uuid).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_project() {
        let store = MemoryStore::new();
        let project = seed_project(&store).await;
        let update = UpdateProject {
            name: Some("payments-v2".to_string()),
            description: Some("card processing".to_string()),
            ..Default::default()
        };

        let updated = store
            .update_project(&project.uuid, &update)
            .await
            .unwrap()
            .expect("project exists");
        assert_eq!(updated.name, "payments-v2");
        assert_eq!(updated.version, project.version);
        assert_eq!(updated.description.as_deref(), Some("card processing"));
        assert_eq!(store.find_project(&project.uuid).await.unwrap(), Some(updated));

        let missing = store.update_project(&ProjectUuid::new(), &update).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_page_past_the_end_is_empty() {
        let store = MemoryStore::new();
        let project = seed_project(&store).await;
        store.create(&create_scan(&project, Vec::new())).await.unwrap();

        let page = store
            .find_by_project(&project.uuid, &PageRequest::new(u64::MAX, 25))
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 1);

        let projects = store.list_projects(&PageRequest::new(u64::MAX, 25)).await.unwrap();
        assert!(projects.items.is_empty());
    }
}
