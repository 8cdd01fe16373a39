use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};

use crate::error::{LedgerError, Result};
use crate::model::{Beverage, Ingredient, NewBeverage, RecipeLine, StockAdjustment, StockDecrement};
use crate::store::{CatalogWriter, Ledger, remaining_after, total_by_ingredient};
use crate::{BeverageId, IngredientId, Money};

/// PostgreSQL-backed ledger implementation.
///
/// Non-negativity is enforced twice: decrements are guarded in the `UPDATE`
/// predicate, and the schema carries a `CHECK (stock_units >= 0)` constraint.
#[derive(Clone)]
pub struct PostgresLedger {
    pool: PgPool,
}

impl PostgresLedger {
    /// Creates a new PostgreSQL ledger.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database at `url`.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_ingredient(row: &PgRow) -> Result<Ingredient> {
        Ok(Ingredient {
            id: IngredientId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            stock_units: to_u32(row.try_get("stock_units")?, "stock_units")?,
        })
    }

    fn row_to_recipe_line(row: &PgRow) -> Result<RecipeLine> {
        Ok(RecipeLine {
            ingredient_id: IngredientId::new(row.try_get("ingredient_id")?),
            ingredient_name: row.try_get("ingredient_name")?,
            quantity: to_u32(row.try_get("quantity")?, "quantity")?,
            unit: row.try_get("unit")?,
        })
    }

    async fn current_stock(
        tx: &mut Transaction<'_, Postgres>,
        id: IngredientId,
        for_update: bool,
    ) -> Result<u32> {
        let sql = if for_update {
            "SELECT stock_units FROM ingredients WHERE id = $1 FOR UPDATE"
        } else {
            "SELECT stock_units FROM ingredients WHERE id = $1"
        };
        let stock: Option<i64> = sqlx::query_scalar(sql)
            .bind(id.as_i64())
            .fetch_optional(&mut **tx)
            .await?;
        match stock {
            Some(level) => to_u32(level, "stock_units"),
            None => Err(LedgerError::IngredientNotFound(id)),
        }
    }

    async fn ingredients_in(
        executor: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<Ingredient>> {
        let rows = sqlx::query("SELECT id, name, stock_units FROM ingredients ORDER BY name ASC")
            .fetch_all(&mut **executor)
            .await?;
        rows.iter().map(Self::row_to_ingredient).collect()
    }
}

fn to_u32(value: i64, column: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| LedgerError::Corrupt(format!("{column} value {value} out of range")))
}

fn map_unique_violation(err: sqlx::Error, constraint: &str, name: &str) -> LedgerError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.constraint() == Some(constraint)
    {
        return LedgerError::DuplicateName(name.to_string());
    }
    LedgerError::Database(err)
}

#[async_trait]
impl Ledger for PostgresLedger {
    async fn fetch_beverage_with_recipe(&self, id: BeverageId) -> Result<Option<Beverage>> {
        let Some(row) = sqlx::query("SELECT id, name, price_cents FROM beverages WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let lines = sqlx::query(
            r#"
            SELECT r.ingredient_id, i.name AS ingredient_name, r.quantity, r.unit
            FROM recipe_lines r
            JOIN ingredients i ON i.id = r.ingredient_id
            WHERE r.beverage_id = $1
            ORDER BY r.position ASC
            "#,
        )
        .bind(id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Beverage {
            id: BeverageId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            recipe: lines
                .iter()
                .map(Self::row_to_recipe_line)
                .collect::<Result<_>>()?,
        }))
    }

    async fn fetch_ingredients_by_ids(
        &self,
        ids: &[IngredientId],
    ) -> Result<HashMap<IngredientId, Ingredient>> {
        let raw: Vec<i64> = ids.iter().map(IngredientId::as_i64).collect();
        let rows = sqlx::query("SELECT id, name, stock_units FROM ingredients WHERE id = ANY($1)")
            .bind(raw)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| Self::row_to_ingredient(row).map(|i| (i.id, i)))
            .collect()
    }

    async fn find_ingredient_by_name(&self, name: &str) -> Result<Option<Ingredient>> {
        let row = sqlx::query(
            "SELECT id, name, stock_units FROM ingredients WHERE LOWER(name) = LOWER($1)",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(Self::row_to_ingredient).transpose()
    }

    #[tracing::instrument(skip(self, lines), fields(lines = lines.len()))]
    async fn atomic_decrement(&self, lines: &[StockDecrement]) -> Result<()> {
        let started = std::time::Instant::now();
        let totals = total_by_ingredient(lines);

        // Any early return drops the transaction, which rolls it back.
        let mut tx = self.pool.begin().await?;
        for (id, requested) in totals {
            let updated: Option<i64> = sqlx::query_scalar(
                r#"
                UPDATE ingredients
                SET stock_units = stock_units - $1
                WHERE id = $2 AND stock_units >= $1
                RETURNING stock_units
                "#,
            )
            .bind(i64::try_from(requested).unwrap_or(i64::MAX))
            .bind(id.as_i64())
            .fetch_optional(&mut *tx)
            .await?;

            if updated.is_none() {
                let available = Self::current_stock(&mut tx, id, false).await?;
                remaining_after(id, available, requested)?;
                return Err(LedgerError::Corrupt(format!(
                    "decrement of ingredient {id} matched no row"
                )));
            }
        }
        tx.commit().await?;

        metrics::histogram!("ledger_commit_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        Ok(())
    }

    async fn list_beverages(&self) -> Result<Vec<Beverage>> {
        let rows = sqlx::query("SELECT id, name, price_cents FROM beverages ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        let line_rows = sqlx::query(
            r#"
            SELECT r.beverage_id, r.ingredient_id, i.name AS ingredient_name, r.quantity, r.unit
            FROM recipe_lines r
            JOIN ingredients i ON i.id = r.ingredient_id
            ORDER BY r.beverage_id ASC, r.position ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut recipes: HashMap<i64, Vec<RecipeLine>> = HashMap::new();
        for row in &line_rows {
            let beverage_id: i64 = row.try_get("beverage_id")?;
            recipes
                .entry(beverage_id)
                .or_default()
                .push(Self::row_to_recipe_line(row)?);
        }

        rows.iter()
            .map(|row| {
                let id: i64 = row.try_get("id")?;
                Ok(Beverage {
                    id: BeverageId::new(id),
                    name: row.try_get("name")?,
                    price: Money::from_cents(row.try_get("price_cents")?),
                    recipe: recipes.remove(&id).unwrap_or_default(),
                })
            })
            .collect()
    }

    async fn list_ingredients(&self) -> Result<Vec<Ingredient>> {
        let rows = sqlx::query("SELECT id, name, stock_units FROM ingredients ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::row_to_ingredient).collect()
    }

    #[tracing::instrument(skip(self, changes), fields(changes = changes.len()))]
    async fn adjust_stock(&self, changes: &[StockAdjustment]) -> Result<Vec<Ingredient>> {
        let mut tx = self.pool.begin().await?;
        for change in changes {
            let current = Self::current_stock(&mut tx, change.id, true).await?;
            let next = change.op.apply(change.id, current, change.amount)?;
            sqlx::query("UPDATE ingredients SET stock_units = $1 WHERE id = $2")
                .bind(i64::from(next))
                .bind(change.id.as_i64())
                .execute(&mut *tx)
                .await?;
        }
        let all = Self::ingredients_in(&mut tx).await?;
        tx.commit().await?;
        Ok(all)
    }
}

#[async_trait]
impl CatalogWriter for PostgresLedger {
    async fn add_ingredient(&self, name: &str, stock_units: u32) -> Result<IngredientId> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO ingredients (name, stock_units) VALUES ($1, $2) RETURNING id",
        )
        .bind(name)
        .bind(i64::from(stock_units))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "unique_ingredient_name", name))?;
        Ok(IngredientId::new(id))
    }

    async fn add_beverage(&self, beverage: NewBeverage) -> Result<BeverageId> {
        beverage.validate()?;

        let mut tx = self.pool.begin().await?;

        let wanted: Vec<i64> = beverage
            .recipe
            .iter()
            .map(|l| l.ingredient_id.as_i64())
            .collect();
        let known: Vec<i64> = sqlx::query_scalar("SELECT id FROM ingredients WHERE id = ANY($1)")
            .bind(&wanted)
            .fetch_all(&mut *tx)
            .await?;
        if let Some(missing) = wanted.iter().find(|id| !known.contains(id)) {
            return Err(LedgerError::IngredientNotFound(IngredientId::new(*missing)));
        }

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO beverages (name, price_cents) VALUES ($1, $2) RETURNING id",
        )
        .bind(&beverage.name)
        .bind(beverage.price.cents())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "unique_beverage_name", &beverage.name))?;

        for (position, line) in beverage.recipe.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO recipe_lines (beverage_id, position, ingredient_id, quantity, unit)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(id)
            .bind(position as i32)
            .bind(line.ingredient_id.as_i64())
            .bind(i64::from(line.quantity))
            .bind(&line.unit)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(BeverageId::new(id))
    }
}
