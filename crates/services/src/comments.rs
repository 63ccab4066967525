//! # Comment Tree Manager
//!
//! Maintains the materialized-path comment hierarchy: creation (with the
//! parent override and thread anchoring rules), ordered retrieval, body
//! updates and subtree deletion. The path itself is assigned inside the
//! repository's transactional insert, since it needs the new row id.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domains::{
    Actor, BlogRepo, Comment, CommentFilter, CommentRecord, CommentRepo, CommentUpdate,
    DomainError, NewComment, Result,
};

use crate::policy::PolicyEngine;

#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentRepo>,
    blogs: Arc<dyn BlogRepo>,
    policy: Arc<PolicyEngine>,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepo>,
        blogs: Arc<dyn BlogRepo>,
        policy: Arc<PolicyEngine>,
    ) -> Self {
        Self {
            comments,
            blogs,
            policy,
        }
    }

    /// Create a comment on a blog, or a reply under a parent comment.
    ///
    /// A parent supplies the blog and the thread anchor, overriding a
    /// directly-supplied blog. A directly-supplied blog must permit comments;
    /// replies within an existing thread are allowed regardless, so closing a
    /// blog to new threads does not sever ongoing conversations.
    pub async fn create(&self, actor: &Actor, request: NewComment) -> Result<Comment> {
        let author = match actor.account() {
            Some(account) if self.policy.account_confirmed(account) => account,
            _ => {
                return Err(DomainError::Validation(
                    "unable to comment without a confirmed account".to_string(),
                ))
            }
        };

        let mut blog_id = None;
        if let Some(id) = request.blog_id {
            let blog = self
                .blogs
                .get(id)
                .await?
                .ok_or(DomainError::NotFound("blog"))?;
            if !blog.comment {
                return Err(DomainError::Validation(
                    "cannot create comments on this blog".to_string(),
                ));
            }
            blog_id = Some(blog.id);
        }

        let mut thread_at: Option<DateTime<Utc>> = None;
        let mut parent_path = None;
        if let Some(id) = request.parent_id {
            let parent = self
                .comments
                .get(id)
                .await?
                .ok_or(DomainError::NotFound("comment"))?;
            blog_id = Some(parent.blog_id);
            thread_at = Some(parent.thread_at);
            parent_path = Some(parent.path);
        }

        let Some(blog_id) = blog_id else {
            return Err(DomainError::Validation(
                "a blog or parent comment is required".to_string(),
            ));
        };

        let record = CommentRecord {
            body: request.body,
            author_id: Some(author.id),
            blog_id,
            parent_id: request.parent_id,
            parent_path,
            thread_at: thread_at.unwrap_or_else(Utc::now),
        };
        let comment = self.comments.insert(record).await.map_err(|error| {
            tracing::error!(%error, blog_id, "comment insert failed");
            DomainError::UnableToCreate("comment")
        })?;
        tracing::debug!(comment = comment.id, blog = comment.blog_id, path = %comment.path, "comment created");
        Ok(comment)
    }

    pub async fn get(&self, id: i64) -> Result<Comment> {
        self.comments
            .get(id)
            .await?
            .ok_or(DomainError::NotFound("comment"))
    }

    /// Matching comments ordered newest thread first, pre-order within each
    /// thread. The caller renders nesting straight from `path`.
    pub async fn list(&self, filter: CommentFilter) -> Result<Vec<Comment>> {
        self.comments.list(filter).await
    }

    /// Authors may change the body, nothing else.
    pub async fn update(&self, comment: &Comment, update: CommentUpdate) -> Result<Comment> {
        self.comments
            .update_body(comment.id, &update.body)
            .await
            .map_err(|error| {
                tracing::error!(%error, comment = comment.id, "comment update failed");
                DomainError::UnableToUpdate("comment")
            })
    }

    /// Delete a comment and its entire reply subtree.
    pub async fn delete(&self, comment: &Comment) -> Result<u64> {
        let removed = self
            .comments
            .delete_subtree(&comment.path)
            .await
            .map_err(|error| {
                tracing::error!(%error, comment = comment.id, "comment delete failed");
                DomainError::UnableToDelete("comment")
            })?;
        tracing::debug!(comment = comment.id, removed, "comment subtree deleted");
        Ok(removed)
    }
}
