//! List and task use-cases for one authenticated user.
//!
//! # Invariants
//! - Every call is scoped to `owner`; foreign rows surface as `NotFound`.
//! - Task listing on a foreign or missing list fails instead of returning
//!   an empty page.

use super::{found, ServiceResult};
use crate::model::list::{ListPatch, NewList, NewTask, Task, TaskList, TaskPatch};
use crate::model::{ListId, TaskId, UserId};
use crate::repo::list_repo::ListRepository;
use crate::repo::now_utc;
use crate::repo::task_repo::TaskRepository;
use log::info;

pub struct ListService<L: ListRepository, T: TaskRepository> {
    lists: L,
    tasks: T,
}

impl<L: ListRepository, T: TaskRepository> ListService<L, T> {
    pub fn new(lists: L, tasks: T) -> Self {
        Self { lists, tasks }
    }

    pub fn list_lists(&self, owner: UserId) -> ServiceResult<Vec<TaskList>> {
        Ok(self.lists.list_lists(owner)?)
    }

    pub fn get_list(&self, owner: UserId, id: ListId) -> ServiceResult<TaskList> {
        found(self.lists.get_list(owner, id)?, "list", id)
    }

    pub fn create_list(&self, owner: UserId, list: &NewList) -> ServiceResult<TaskList> {
        let created = self.lists.create_list(owner, list, now_utc())?;
        info!(
            "event=list_create module=service status=ok user_id={} list_id={}",
            owner, created.id
        );
        Ok(created)
    }

    pub fn update_list(
        &self,
        owner: UserId,
        id: ListId,
        patch: &ListPatch,
    ) -> ServiceResult<TaskList> {
        let mut list = self.get_list(owner, id)?;
        list.apply(patch)?;
        Ok(self.lists.update_list(owner, &list)?)
    }

    pub fn delete_list(&self, owner: UserId, id: ListId) -> ServiceResult<()> {
        self.lists.delete_list(owner, id)?;
        info!(
            "event=list_delete module=service status=ok user_id={} list_id={}",
            owner, id
        );
        Ok(())
    }

    pub fn list_tasks(&self, owner: UserId, list_id: ListId) -> ServiceResult<Vec<Task>> {
        self.get_list(owner, list_id)?;
        Ok(self.tasks.list_tasks(owner, list_id)?)
    }

    pub fn get_task(&self, owner: UserId, id: TaskId) -> ServiceResult<Task> {
        found(self.tasks.get_task(owner, id)?, "task", id)
    }

    pub fn create_task(
        &self,
        owner: UserId,
        list_id: ListId,
        task: &NewTask,
    ) -> ServiceResult<Task> {
        let created = self.tasks.create_task(owner, list_id, task, now_utc())?;
        info!(
            "event=task_create module=service status=ok user_id={} list_id={} task_id={}",
            owner, list_id, created.id
        );
        Ok(created)
    }

    pub fn update_task(&self, owner: UserId, id: TaskId, patch: &TaskPatch) -> ServiceResult<Task> {
        let mut task = self.get_task(owner, id)?;
        if patch.is_empty() {
            return Ok(task);
        }
        task.apply(patch, now_utc())?;
        Ok(self.tasks.update_task(owner, &task)?)
    }

    pub fn delete_task(&self, owner: UserId, id: TaskId) -> ServiceResult<()> {
        self.tasks.delete_task(owner, id)?;
        info!(
            "event=task_delete module=service status=ok user_id={} task_id={}",
            owner, id
        );
        Ok(())
    }
}
