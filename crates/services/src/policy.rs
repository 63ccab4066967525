//! # Policy Engine
//!
//! Answers "can this actor perform this action on this resource" with one
//! rule table shared by the server-rendered views, the admin panel and the
//! REST API. Rules are additive: every grant that matches is unioned, and the
//! absence of a grant is the only way to deny.
//!
//! Roles are plain data switched over in one evaluator, so the whole rule
//! table is auditable in [`PolicyEngine::grants`].

use domains::{Account, Actor, Blog, Category, Comment, DomainError, Result};

/// Actions an actor may attempt. `Manage` subsumes all of the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Edit,
    Delete,
    Manage,
}

impl Action {
    fn as_str(self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Manage => "manage",
        }
    }
}

/// The resource types the policy knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Account,
    Blog,
    Category,
    Comment,
}

impl ResourceKind {
    fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Account => "account",
            ResourceKind::Blog => "blog",
            ResourceKind::Category => "category",
            ResourceKind::Comment => "comment",
        }
    }
}

/// A resource instance under evaluation.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Account(&'a Account),
    Blog(&'a Blog),
    Category(&'a Category),
    Comment(&'a Comment),
}

impl Resource<'_> {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Account(_) => ResourceKind::Account,
            Resource::Blog(_) => ResourceKind::Blog,
            Resource::Category(_) => ResourceKind::Category,
            Resource::Comment(_) => ResourceKind::Comment,
        }
    }
}

/// The condition limiting a grant to a subset of a resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// No restriction.
    Any,
    /// Accounts whose id matches (self-service grants).
    AccountId(i64),
    /// Blogs/comments authored by the given account (ownership grants).
    AuthorId(i64),
    /// Published blogs only.
    Published,
}

impl Scope {
    pub fn permits(&self, resource: &Resource<'_>) -> bool {
        match (self, resource) {
            (Scope::Any, _) => true,
            (Scope::AccountId(id), Resource::Account(account)) => account.id == *id,
            (Scope::AuthorId(id), Resource::Blog(blog)) => blog.author_id == Some(*id),
            (Scope::AuthorId(id), Resource::Comment(comment)) => comment.author_id == Some(*id),
            (Scope::Published, Resource::Blog(blog)) => blog.is_published(),
            _ => false,
        }
    }
}

/// What a grant covers: one resource type, or everything (admin).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subject {
    All,
    Kind(ResourceKind),
}

/// An (action-set, subject, scope) triple produced for one actor.
#[derive(Debug, Clone, Copy)]
struct Grant {
    actions: &'static [Action],
    subject: Subject,
    scope: Scope,
}

impl Grant {
    fn allows(&self, action: Action) -> bool {
        self.actions.contains(&Action::Manage) || self.actions.contains(&action)
    }

    fn covers(&self, kind: ResourceKind) -> bool {
        match self.subject {
            Subject::All => true,
            Subject::Kind(subject) => subject == kind,
        }
    }
}

const READ: &[Action] = &[Action::Read];
const CREATE: &[Action] = &[Action::Create];
const MANAGE: &[Action] = &[Action::Manage];
const READ_EDIT_DELETE: &[Action] = &[Action::Read, Action::Edit, Action::Delete];

/// The outcome of evaluating an action against a resource *type*: whether any
/// grant applies at all, and the unioned scope predicates for filtering a
/// collection down to the visible subset.
#[derive(Debug, Clone)]
pub struct Decision {
    pub allowed: bool,
    pub scopes: Vec<Scope>,
}

impl Decision {
    pub fn is_unrestricted(&self) -> bool {
        self.scopes.contains(&Scope::Any)
    }

    pub fn permits(&self, resource: &Resource<'_>) -> bool {
        self.allowed && self.scopes.iter().any(|scope| scope.permits(resource))
    }
}

/// Configuration injected at construction; the engine holds no other state.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyOptions {
    /// Treat every account as confirmed (the original deployment toggle for
    /// environments without outbound mail).
    pub always_confirmed: bool,
}

/// Stateless, side-effect-free authorization decisions.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    always_confirmed: bool,
}

impl PolicyEngine {
    pub fn new(options: PolicyOptions) -> Self {
        Self {
            always_confirmed: options.always_confirmed,
        }
    }

    /// Whether the account counts as confirmed under the active options.
    pub fn account_confirmed(&self, account: &Account) -> bool {
        self.always_confirmed || account.confirmed
    }

    /// The full additive rule list for one actor.
    fn grants(&self, actor: &Actor) -> Vec<Grant> {
        let mut rules = Vec::with_capacity(9);
        if let Actor::Account(account) = actor {
            if account.admin {
                // Admins can do anything.
                rules.push(Grant {
                    actions: MANAGE,
                    subject: Subject::All,
                    scope: Scope::Any,
                });
            } else if self.account_confirmed(account) {
                // Confirmed accounts manage their own account...
                rules.push(Grant {
                    actions: READ_EDIT_DELETE,
                    subject: Subject::Kind(ResourceKind::Account),
                    scope: Scope::AccountId(account.id),
                });
                // ...create blogs and manage their own...
                rules.push(Grant {
                    actions: CREATE,
                    subject: Subject::Kind(ResourceKind::Blog),
                    scope: Scope::Any,
                });
                rules.push(Grant {
                    actions: READ_EDIT_DELETE,
                    subject: Subject::Kind(ResourceKind::Blog),
                    scope: Scope::AuthorId(account.id),
                });
                // ...and comment. The blog's comment flag and author
                // confirmation are enforced at the operation layer.
                rules.push(Grant {
                    actions: READ_EDIT_DELETE,
                    subject: Subject::Kind(ResourceKind::Comment),
                    scope: Scope::AuthorId(account.id),
                });
                rules.push(Grant {
                    actions: CREATE,
                    subject: Subject::Kind(ResourceKind::Comment),
                    scope: Scope::Any,
                });
            }
        }
        // Universal grants, applied to every actor including anonymous and
        // unconfirmed ones: read accounts, categories and comments, and read
        // published blogs.
        rules.push(Grant {
            actions: READ,
            subject: Subject::Kind(ResourceKind::Account),
            scope: Scope::Any,
        });
        rules.push(Grant {
            actions: READ,
            subject: Subject::Kind(ResourceKind::Category),
            scope: Scope::Any,
        });
        rules.push(Grant {
            actions: READ,
            subject: Subject::Kind(ResourceKind::Comment),
            scope: Scope::Any,
        });
        rules.push(Grant {
            actions: READ,
            subject: Subject::Kind(ResourceKind::Blog),
            scope: Scope::Published,
        });
        rules
    }

    /// Instance decision: may `actor` perform `action` on `resource`?
    pub fn evaluate(&self, actor: &Actor, action: Action, resource: &Resource<'_>) -> bool {
        self.grants(actor)
            .iter()
            .any(|grant| {
                grant.allows(action)
                    && grant.covers(resource.kind())
                    && grant.scope.permits(resource)
            })
    }

    /// Type decision: may `actor` perform `action` on `kind` at all, and
    /// which subset of the collection is visible?
    pub fn evaluate_collection(&self, actor: &Actor, action: Action, kind: ResourceKind) -> Decision {
        let scopes: Vec<Scope> = self
            .grants(actor)
            .iter()
            .filter(|grant| grant.allows(action) && grant.covers(kind))
            .map(|grant| grant.scope)
            .collect();
        Decision {
            allowed: !scopes.is_empty(),
            scopes,
        }
    }

    /// Gate a single action; a denial is fatal to the invoking operation.
    pub fn assert_allowed(&self, actor: &Actor, action: Action, resource: &Resource<'_>) -> Result<()> {
        if self.evaluate(actor, action, resource) {
            Ok(())
        } else {
            tracing::debug!(
                action = action.as_str(),
                resource = resource.kind().as_str(),
                "authorization denied"
            );
            Err(DomainError::Forbidden(format!(
                "cannot {} this {}",
                action.as_str(),
                resource.kind().as_str()
            )))
        }
    }

    /// Gate a create action, which has no instance to scope against.
    pub fn assert_can_create(&self, actor: &Actor, kind: ResourceKind) -> Result<()> {
        if self.evaluate_collection(actor, Action::Create, kind).allowed {
            Ok(())
        } else {
            Err(DomainError::Forbidden(format!(
                "cannot create a {}",
                kind.as_str()
            )))
        }
    }

    /// The admin surface gate: rule 2a and nothing else.
    pub fn require_admin(&self, actor: &Actor) -> Result<()> {
        match actor.account() {
            Some(account) if account.admin => Ok(()),
            _ => Err(DomainError::Forbidden("admin access required".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{account, blog, category, comment};

    fn engine() -> PolicyEngine {
        PolicyEngine::new(PolicyOptions::default())
    }

    #[test]
    fn anonymous_reads_published_blogs_only() {
        let engine = engine();
        let published = blog(1, Some(1), true, true);
        let draft = blog(2, Some(1), false, true);
        assert!(engine.evaluate(&Actor::Anonymous, Action::Read, &Resource::Blog(&published)));
        assert!(!engine.evaluate(&Actor::Anonymous, Action::Read, &Resource::Blog(&draft)));
        assert!(!engine.evaluate(&Actor::Anonymous, Action::Edit, &Resource::Blog(&published)));
    }

    #[test]
    fn anonymous_reads_accounts_categories_and_comments() {
        let engine = engine();
        let someone = account(1, false, true);
        let cat = category(1);
        let note = comment(1, Some(1), 1, "000001");
        assert!(engine.evaluate(&Actor::Anonymous, Action::Read, &Resource::Account(&someone)));
        assert!(engine.evaluate(&Actor::Anonymous, Action::Read, &Resource::Category(&cat)));
        assert!(engine.evaluate(&Actor::Anonymous, Action::Read, &Resource::Comment(&note)));
        assert!(!engine.evaluate(&Actor::Anonymous, Action::Edit, &Resource::Account(&someone)));
    }

    #[test]
    fn admin_can_do_anything() {
        let engine = engine();
        let actor = Actor::Account(account(1, true, true));
        let draft = blog(9, Some(2), false, false);
        let other = account(2, false, true);
        let cat = category(1);
        for action in [Action::Read, Action::Create, Action::Edit, Action::Delete] {
            assert!(engine.evaluate(&actor, action, &Resource::Blog(&draft)));
            assert!(engine.evaluate(&actor, action, &Resource::Account(&other)));
            assert!(engine.evaluate(&actor, action, &Resource::Category(&cat)));
        }
    }

    #[test]
    fn confirmed_account_edits_only_its_own_blogs() {
        let engine = engine();
        let actor = Actor::Account(account(1, false, true));
        let mine = blog(1, Some(1), false, true);
        let theirs = blog(2, Some(2), true, true);
        assert!(engine.evaluate(&actor, Action::Edit, &Resource::Blog(&mine)));
        assert!(engine.evaluate(&actor, Action::Delete, &Resource::Blog(&mine)));
        assert!(!engine.evaluate(&actor, Action::Edit, &Resource::Blog(&theirs)));
        // CREATE succeeding for blogs generally does not leak into EDIT on
        // someone else's instance.
        assert!(engine.assert_can_create(&actor, ResourceKind::Blog).is_ok());
        assert!(engine
            .assert_allowed(&actor, Action::Edit, &Resource::Blog(&theirs))
            .is_err());
    }

    #[test]
    fn confirmed_account_reads_own_drafts() {
        let engine = engine();
        let actor = Actor::Account(account(1, false, true));
        let my_draft = blog(1, Some(1), false, true);
        let their_draft = blog(2, Some(2), false, true);
        assert!(engine.evaluate(&actor, Action::Read, &Resource::Blog(&my_draft)));
        assert!(!engine.evaluate(&actor, Action::Read, &Resource::Blog(&their_draft)));
    }

    #[test]
    fn unconfirmed_account_gets_universal_grants_only() {
        let engine = engine();
        let actor = Actor::Account(account(1, false, false));
        let published = blog(2, Some(2), true, true);
        let own_account = account(1, false, false);
        assert!(engine.assert_can_create(&actor, ResourceKind::Blog).is_err());
        assert!(engine.assert_can_create(&actor, ResourceKind::Comment).is_err());
        assert!(engine.evaluate(&actor, Action::Read, &Resource::Blog(&published)));
        assert!(!engine.evaluate(&actor, Action::Edit, &Resource::Account(&own_account)));
    }

    #[test]
    fn always_confirmed_override_promotes_unconfirmed_accounts() {
        let engine = PolicyEngine::new(PolicyOptions {
            always_confirmed: true,
        });
        let actor = Actor::Account(account(1, false, false));
        assert!(engine.assert_can_create(&actor, ResourceKind::Blog).is_ok());
    }

    #[test]
    fn confirmed_account_owns_its_comments() {
        let engine = engine();
        let actor = Actor::Account(account(1, false, true));
        let mine = comment(1, Some(1), 1, "000001");
        let theirs = comment(2, Some(2), 1, "000002");
        let orphaned = comment(3, None, 1, "000003");
        assert!(engine.evaluate(&actor, Action::Edit, &Resource::Comment(&mine)));
        assert!(engine.evaluate(&actor, Action::Delete, &Resource::Comment(&mine)));
        assert!(!engine.evaluate(&actor, Action::Edit, &Resource::Comment(&theirs)));
        assert!(!engine.evaluate(&actor, Action::Edit, &Resource::Comment(&orphaned)));
    }

    #[test]
    fn collection_scopes_union_ownership_and_published() {
        let engine = engine();
        let actor = Actor::Account(account(1, false, true));
        let decision = engine.evaluate_collection(&actor, Action::Read, ResourceKind::Blog);
        assert!(decision.allowed);
        assert!(!decision.is_unrestricted());
        assert!(decision.scopes.contains(&Scope::AuthorId(1)));
        assert!(decision.scopes.contains(&Scope::Published));
        let my_draft = blog(1, Some(1), false, true);
        let their_draft = blog(2, Some(2), false, true);
        let published = blog(3, Some(2), true, true);
        assert!(decision.permits(&Resource::Blog(&my_draft)));
        assert!(!decision.permits(&Resource::Blog(&their_draft)));
        assert!(decision.permits(&Resource::Blog(&published)));
    }

    #[test]
    fn admin_collection_scope_is_unrestricted() {
        let engine = engine();
        let actor = Actor::Account(account(1, true, true));
        let decision = engine.evaluate_collection(&actor, Action::Read, ResourceKind::Blog);
        assert!(decision.allowed);
        assert!(decision.is_unrestricted());
    }

    #[test]
    fn category_writes_are_admin_only() {
        let engine = engine();
        let confirmed = Actor::Account(account(1, false, true));
        let admin = Actor::Account(account(2, true, true));
        let cat = category(1);
        assert!(engine.assert_can_create(&confirmed, ResourceKind::Category).is_err());
        assert!(engine.assert_can_create(&admin, ResourceKind::Category).is_ok());
        assert!(!engine.evaluate(&confirmed, Action::Delete, &Resource::Category(&cat)));
        assert!(engine.evaluate(&admin, Action::Delete, &Resource::Category(&cat)));
    }

    #[test]
    fn require_admin_rejects_everyone_else() {
        let engine = engine();
        assert!(engine.require_admin(&Actor::Anonymous).is_err());
        assert!(engine
            .require_admin(&Actor::Account(account(1, false, true)))
            .is_err());
        assert!(engine
            .require_admin(&Actor::Account(account(2, true, false)))
            .is_ok());
    }
}
