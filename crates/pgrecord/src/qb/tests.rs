//! Rendering and state tests for the query builder.

use crate::error::OrmError;
use crate::qb::{Chain, Operation, QueryBuilder, UNBOUNDED_LIMIT};

fn select(table: &str) -> QueryBuilder {
    let mut qb = QueryBuilder::new();
    qb.set_operation(Operation::Select).set_table(table);
    qb
}

#[test]
fn test_select_basic() {
    let mut qb = select("users");
    assert_eq!(qb.render().unwrap(), "SELECT * FROM users");
}

#[test]
fn test_select_columns() {
    let mut qb = select("users");
    qb.set_columns(["id", "name"]);
    assert_eq!(qb.render().unwrap(), "SELECT id,name FROM users");
}

#[test]
fn test_first_condition_two_shapes() {
    let mut qb = select("users");
    qb.add_condition("id", ":id");
    assert_eq!(qb.render().unwrap(), "SELECT * FROM users WHERE id=:id");

    qb.add_condition_op("age", ">=", ":age");
    assert_eq!(qb.render().unwrap(), "SELECT * FROM users WHERE age>=:age");
}

#[test]
fn test_chain_and_or() {
    let mut qb = select("t");
    qb.add_condition("a", ":a")
        .set_chain(Chain::And)
        .add_condition("b", ":b")
        .set_chain(Chain::Or)
        .add_condition_op("c", "<", ":c");
    assert_eq!(
        qb.render().unwrap(),
        "SELECT * FROM t WHERE a=:a AND b=:b OR c<:c"
    );
}

#[test]
fn test_chain_is_consumed_once() {
    let mut qb = select("t");
    qb.add_condition("a", ":a")
        .set_chain(Chain::And)
        .add_condition("b", ":b");
    assert_eq!(qb.chain(), None);

    // A second unchained condition replaces everything.
    qb.add_condition("c", ":c");
    assert_eq!(qb.render().unwrap(), "SELECT * FROM t WHERE c=:c");
}

#[test]
fn test_chain_before_first_condition_is_ignored() {
    let mut qb = select("t");
    qb.set_chain(Chain::Or).add_condition("a", ":a");
    assert_eq!(qb.render().unwrap(), "SELECT * FROM t WHERE a=:a");
}

#[test]
fn test_group_by_moves_conditions_to_having() {
    let mut qb = select("orders");
    qb.set_columns(["user_id", "COUNT(*) AS n"])
        .set_group_by(["user_id"])
        .add_condition_op("COUNT(*)", ">", ":n");
    assert_eq!(
        qb.render().unwrap(),
        "SELECT user_id,COUNT(*) AS n FROM orders GROUP BY user_id HAVING COUNT(*)>:n"
    );
}

#[test]
fn test_group_by_without_conditions() {
    let mut qb = select("orders");
    qb.set_columns(["user_id"]).set_group_by(["user_id", "status"]);
    assert_eq!(
        qb.render().unwrap(),
        "SELECT user_id FROM orders GROUP BY user_id,status"
    );
}

#[test]
fn test_join_order_and_pagination() {
    let mut qb = select("users");
    qb.add_join("INNER JOIN posts ON posts.user_id = users.id")
        .add_join("LEFT JOIN avatars ON avatars.user_id = users.id")
        .add_condition("users.status", ":users_status")
        .set_order_by(["users.created_at DESC", "users.id"])
        .set_offset(10)
        .set_limit(5);
    assert_eq!(
        qb.render().unwrap(),
        "SELECT * FROM users INNER JOIN posts ON posts.user_id = users.id \
         LEFT JOIN avatars ON avatars.user_id = users.id WHERE users.status=:users_status \
         ORDER BY users.created_at DESC,users.id LIMIT 5 OFFSET 10"
    );
}

#[test]
fn test_pagination_defaults_render_nothing() {
    let mut qb = select("t");
    qb.set_offset(0).set_limit(UNBOUNDED_LIMIT);
    assert_eq!(qb.render().unwrap(), "SELECT * FROM t");
}

#[test]
fn test_limit_without_offset() {
    let mut qb = select("t");
    qb.set_limit(1);
    assert_eq!(qb.render().unwrap(), "SELECT * FROM t LIMIT 1");
}

#[test]
fn test_offset_without_limit() {
    let mut qb = select("t");
    qb.set_offset(20);
    assert_eq!(qb.render().unwrap(), "SELECT * FROM t LIMIT ALL OFFSET 20");
}

#[test]
fn test_insert() {
    let mut qb = QueryBuilder::new();
    qb.set_operation("INSERT")
        .set_table("users")
        .set_columns(["name", "email"])
        .set_values([":name", ":email"]);
    assert_eq!(
        qb.render().unwrap(),
        "INSERT INTO users (name,email) values (:name,:email)"
    );
}

#[test]
fn test_update() {
    let mut qb = QueryBuilder::new();
    qb.set_operation(Operation::Update)
        .set_table("users")
        .set_columns(["x", "y"])
        .set_values([":x", ":y"])
        .add_condition("id", ":id");
    assert_eq!(
        qb.render().unwrap(),
        "UPDATE users SET x=:x,y=:y WHERE id=:id"
    );
}

#[test]
fn test_update_without_conditions() {
    let mut qb = QueryBuilder::new();
    qb.set_operation(Operation::Update)
        .set_table("users")
        .set_columns(["x"])
        .set_values([":x"]);
    assert_eq!(qb.render().unwrap(), "UPDATE users SET x=:x");
}

#[test]
fn test_update_arity_mismatch() {
    let mut qb = QueryBuilder::new();
    qb.set_operation(Operation::Update)
        .set_table("users")
        .set_columns(["x", "y"])
        .set_values([":x"]);
    let err = qb.render().unwrap_err();
    assert!(matches!(
        err,
        OrmError::ArityMismatch {
            columns: 2,
            values: 1
        }
    ));
}

#[test]
fn test_delete() {
    let mut qb = QueryBuilder::new();
    qb.set_operation(Operation::Delete)
        .set_table("users")
        .add_condition("id", ":id");
    assert_eq!(qb.render().unwrap(), "DELETE FROM users WHERE id=:id");

    qb.set_operation(Operation::Delete);
    assert_eq!(qb.render().unwrap(), "DELETE FROM users");
}

#[test]
fn test_render_without_operation_fails() {
    let mut qb = QueryBuilder::new();
    qb.set_table("users");
    let err = qb.render().unwrap_err();
    assert!(err.is_unsupported_operation());
}

#[test]
fn test_unknown_operation_fails() {
    let mut qb = QueryBuilder::new();
    qb.set_operation("truncate").set_table("users");
    match qb.render() {
        Err(OrmError::UnsupportedOperation(op)) => assert_eq!(op, "truncate"),
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_failed_render_keeps_state() {
    let mut qb = QueryBuilder::new();
    qb.set_table("users").set_columns(["id"]).add_condition("id", ":id");
    assert!(qb.render().is_err());

    qb.set_operation(Operation::Select);
    assert_eq!(qb.render().unwrap(), "SELECT id FROM users WHERE id=:id");
}

#[test]
fn test_reset_after_render() {
    let mut qb = select("users");
    qb.set_columns(["id"])
        .add_join("INNER JOIN posts ON posts.user_id = users.id")
        .add_condition("id", ":id")
        .set_group_by(["id"])
        .set_order_by(["id"])
        .set_offset(3)
        .set_limit(4)
        .set_chain(Chain::And);
    qb.render().unwrap();

    assert_eq!(qb.columns(), ["*"]);
    assert!(!qb.has_conditions());
    assert_eq!(qb.chain(), None);

    qb.set_operation(Operation::Select).set_table("posts");
    assert_eq!(qb.render().unwrap(), "SELECT * FROM posts");
}

#[test]
fn test_operation_and_table_survive_render() {
    let mut qb = select("users");
    qb.render().unwrap();
    assert_eq!(qb.render().unwrap(), "SELECT * FROM users");
}
