use pgrecord::{DbConfig, Filter, Model, OrmResult, PgDatabase, SaveResult, Schema, Value};
use std::time::{SystemTime, UNIX_EPOCH};

struct Pair;

static PAIRS: std::sync::OnceLock<Schema> = std::sync::OnceLock::new();

impl Model for Pair {
    fn schema() -> &'static Schema {
        PAIRS.get_or_init(|| Schema::new(table_name()))
    }
}

fn table_name() -> &'static str {
    static NAME: std::sync::OnceLock<String> = std::sync::OnceLock::new();
    NAME.get_or_init(|| {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before UNIX_EPOCH")
            .as_nanos();
        format!("pgrecord_pairs_{}_{}", std::process::id(), nanos)
    })
}

#[tokio::test]
async fn store_find_update_destroy_roundtrip() -> OrmResult<()> {
    dotenvy::dotenv().ok();
    let config = match DbConfig::from_env() {
        Ok(config) => config,
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping store_find_update_destroy_roundtrip");
            return Ok(());
        }
    };
    let db = PgDatabase::connect(&config)?;
    let table = table_name();

    let client = db.pool().get().await?;
    client
        .batch_execute(&format!(
            "CREATE TABLE {table} (id BIGSERIAL PRIMARY KEY, a BIGINT NOT NULL, b BIGINT NOT NULL)"
        ))
        .await
        .map_err(pgrecord::OrmError::from_db_error)?;
    drop(client);

    let result = async {
        let id = Pair::store(&db, [("a", 1), ("b", 2)]).await?;
        assert!(!id.is_null());

        let err = Pair::store(&db, [("id", id.clone()), ("a", Value::Int(9)), ("b", Value::Int(9))])
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());

        let mut pair = Pair::find(&db, Filter::key(id.clone()))
            .first()
            .await?
            .expect("stored row");
        assert_eq!(pair.data().unwrap().try_get::<i64>("a")?, 1);
        assert_eq!(pair.data().unwrap().try_get::<i64>("b")?, 2);

        pair.set_attribute("b", 3);
        assert_eq!(pair.save().await?, SaveResult::Updated(1));

        let rows = Pair::filter(&db, Filter::op("b", ">", 2)).rows(&["b"]).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("b"), Some(&Value::Int(3)));

        assert_eq!(Pair::count(&db, None).await?, 1);
        assert_eq!(pair.destroy().await?, 1);
        assert!(Pair::empty(&db).await?);
        OrmResult::Ok(())
    }
    .await;

    let client = db.pool().get().await?;
    client
        .batch_execute(&format!("DROP TABLE IF EXISTS {table}"))
        .await
        .map_err(pgrecord::OrmError::from_db_error)?;
    drop(client);
    db.close();

    result
}
