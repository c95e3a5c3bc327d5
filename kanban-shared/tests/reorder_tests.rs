/// Integration tests for transactional task reordering
///
/// Require PostgreSQL via `DATABASE_URL`; skipped otherwise.

mod common;

use kanban_shared::auth::middleware::AuthContext;
use kanban_shared::models::task::{Task, TaskStatus};
use kanban_shared::reorder::{reorder_tasks, ReorderError, ReorderOutcome, ReorderRequest};
use sqlx::PgPool;
use uuid::Uuid;

fn principal(user_id: i64) -> AuthContext {
    AuthContext::new(user_id, Uuid::new_v4())
}

async fn placement(pool: &PgPool, id: i64) -> (TaskStatus, i32) {
    let task = Task::find_by_id(pool, id).await.unwrap().unwrap();
    (task.status, task.order)
}

#[tokio::test]
async fn test_reorder_moves_tasks_into_column() {
    let Some(pool) = common::test_pool().await else {
        return;
    };

    let user = common::create_user(&pool).await;
    let board = common::create_board(&pool, user.id, "Sprint 1").await;
    let x = common::create_task(&pool, board.id, "X", TaskStatus::Todo).await;
    let y = common::create_task(&pool, board.id, "Y", TaskStatus::Todo).await;
    let z = common::create_task(&pool, board.id, "Z", TaskStatus::Todo).await;

    let request = ReorderRequest {
        status: TaskStatus::Done,
        task_ids: vec![z.id, x.id, y.id],
    };

    let outcome = reorder_tasks(&pool, &principal(user.id), &request)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ReorderOutcome::Reordered {
            board_id: board.id,
            count: 3
        }
    );

    assert_eq!(placement(&pool, z.id).await, (TaskStatus::Done, 0));
    assert_eq!(placement(&pool, x.id).await, (TaskStatus::Done, 1));
    assert_eq!(placement(&pool, y.id).await, (TaskStatus::Done, 2));

    // Same request again changes nothing
    reorder_tasks(&pool, &principal(user.id), &request)
        .await
        .unwrap();
    assert_eq!(placement(&pool, z.id).await, (TaskStatus::Done, 0));
    assert_eq!(placement(&pool, y.id).await, (TaskStatus::Done, 2));
}

#[tokio::test]
async fn test_reorder_leaves_unlisted_tasks_alone() {
    let Some(pool) = common::test_pool().await else {
        return;
    };

    let user = common::create_user(&pool).await;
    let board = common::create_board(&pool, user.id, "Board").await;
    let a = common::create_task(&pool, board.id, "A", TaskStatus::Todo).await;
    let b = common::create_task(&pool, board.id, "B", TaskStatus::Todo).await;
    let c = common::create_task(&pool, board.id, "C", TaskStatus::Todo).await;

    reorder_tasks(
        &pool,
        &principal(user.id),
        &ReorderRequest {
            status: TaskStatus::InProgress,
            task_ids: vec![c.id],
        },
    )
    .await
    .unwrap();

    assert_eq!(placement(&pool, a.id).await, (TaskStatus::Todo, 0));
    // Gap left behind at 2 is fine
    assert_eq!(placement(&pool, b.id).await, (TaskStatus::Todo, 1));
    assert_eq!(placement(&pool, c.id).await, (TaskStatus::InProgress, 0));
}

#[tokio::test]
async fn test_reorder_empty_is_noop() {
    let Some(pool) = common::test_pool().await else {
        return;
    };

    let outcome = reorder_tasks(
        &pool,
        &principal(1),
        &ReorderRequest {
            status: TaskStatus::Todo,
            task_ids: vec![],
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome, ReorderOutcome::NothingToDo);
}

#[tokio::test]
async fn test_reorder_rejects_mixed_boards_without_writing() {
    let Some(pool) = common::test_pool().await else {
        return;
    };

    let owner = common::create_user(&pool).await;
    let mine = common::create_board(&pool, owner.id, "Mine").await;
    let also_mine = common::create_board(&pool, owner.id, "Also mine").await;
    let a = common::create_task(&pool, mine.id, "A", TaskStatus::Todo).await;
    let b = common::create_task(&pool, also_mine.id, "B", TaskStatus::Todo).await;

    let result = reorder_tasks(
        &pool,
        &principal(owner.id),
        &ReorderRequest {
            status: TaskStatus::Done,
            task_ids: vec![a.id, b.id],
        },
    )
    .await;

    assert!(matches!(result, Err(ReorderError::CrossBoard)));
    assert_eq!(placement(&pool, a.id).await, (TaskStatus::Todo, 0));
    assert_eq!(placement(&pool, b.id).await, (TaskStatus::Todo, 0));
}

#[tokio::test]
async fn test_reorder_rejects_foreign_tasks() {
    let Some(pool) = common::test_pool().await else {
        return;
    };

    let owner = common::create_user(&pool).await;
    let intruder = common::create_user(&pool).await;
    let board = common::create_board(&pool, owner.id, "Private").await;
    let own_board = common::create_board(&pool, intruder.id, "Intruder").await;
    let victim = common::create_task(&pool, board.id, "Victim", TaskStatus::Todo).await;
    let decoy = common::create_task(&pool, own_board.id, "Decoy", TaskStatus::Todo).await;

    // Foreign board first: denied by policy
    let result = reorder_tasks(
        &pool,
        &principal(intruder.id),
        &ReorderRequest {
            status: TaskStatus::Done,
            task_ids: vec![victim.id],
        },
    )
    .await;
    assert!(matches!(result, Err(ReorderError::Forbidden(_))));

    // Own board first with a foreign task slipped in: denied as cross-board
    let result = reorder_tasks(
        &pool,
        &principal(intruder.id),
        &ReorderRequest {
            status: TaskStatus::Done,
            task_ids: vec![decoy.id, victim.id],
        },
    )
    .await;
    assert!(matches!(result, Err(ReorderError::CrossBoard)));

    assert_eq!(placement(&pool, victim.id).await, (TaskStatus::Todo, 0));
    assert_eq!(placement(&pool, decoy.id).await, (TaskStatus::Todo, 0));
}

#[tokio::test]
async fn test_reorder_unknown_ids() {
    let Some(pool) = common::test_pool().await else {
        return;
    };

    let user = common::create_user(&pool).await;
    let board = common::create_board(&pool, user.id, "Board").await;
    let task = common::create_task(&pool, board.id, "Real", TaskStatus::Todo).await;

    let none_found = reorder_tasks(
        &pool,
        &principal(user.id),
        &ReorderRequest {
            status: TaskStatus::Done,
            task_ids: vec![-1, -2],
        },
    )
    .await;
    assert!(matches!(none_found, Err(ReorderError::NoTasksFound)));

    let partly_found = reorder_tasks(
        &pool,
        &principal(user.id),
        &ReorderRequest {
            status: TaskStatus::Done,
            task_ids: vec![task.id, -1],
        },
    )
    .await;
    match partly_found {
        Err(ReorderError::TasksNotFound(missing)) => assert_eq!(missing, vec![-1]),
        other => panic!("Expected TasksNotFound, got {:?}", other),
    }

    assert_eq!(placement(&pool, task.id).await, (TaskStatus::Todo, 0));
}

#[tokio::test]
async fn test_reorder_fails_whole_batch_when_task_deleted_concurrently() {
    let Some(pool) = common::test_pool().await else {
        return;
    };

    let user = common::create_user(&pool).await;
    let board = common::create_board(&pool, user.id, "Contended").await;
    let a = common::create_task(&pool, board.id, "A", TaskStatus::Todo).await;
    let b = common::create_task(&pool, board.id, "B", TaskStatus::Todo).await;

    // Hold the row lock on B with an uncommitted delete
    let mut deleting = pool.begin().await.unwrap();
    sqlx::query("DELETE FROM tasks WHERE id = $1")
        .bind(b.id)
        .execute(&mut *deleting)
        .await
        .unwrap();

    let reorder = tokio::spawn({
        let pool = pool.clone();
        let principal = principal(user.id);
        let request = ReorderRequest {
            status: TaskStatus::Done,
            task_ids: vec![b.id, a.id],
        };
        async move { reorder_tasks(&pool, &principal, &request).await }
    });

    // Let the reorder block on B's lock before the delete lands
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
    deleting.commit().await.unwrap();

    let result = reorder.await.unwrap();
    assert!(
        matches!(result, Err(ReorderError::TasksNotFound(ref ids)) if ids == &vec![b.id]),
        "unexpected result: {:?}",
        result
    );

    assert_eq!(placement(&pool, a.id).await, (TaskStatus::Todo, 0));
    assert!(Task::find_by_id(&pool, b.id).await.unwrap().is_none());
}
