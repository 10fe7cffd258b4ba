//! Database operations for boards, columns and cards
//!
//! All functions take a `&mut PgConnection` so the ordering service can run
//! each logical operation inside a single transaction: read the current
//! order, compute keys, write, commit. Lists are always read with
//! `ORDER BY rank_key, id` - the id tie-break makes the order deterministic
//! even if concurrent writers ever land equal keys.

use sqlx::{PgConnection, Row};
use uuid::Uuid;

use crate::shared::item::{Board, Card, Column};
use crate::shared::rank::RankKey;

fn rank_from_row(row: &sqlx::postgres::PgRow) -> Result<RankKey, sqlx::Error> {
    let raw: String = row.get("rank_key");
    RankKey::new(raw).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

pub async fn insert_board(conn: &mut PgConnection, board: &Board) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO boards (id, name, created_at)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(board.id)
    .bind(&board.name)
    .bind(board.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn fetch_board(
    conn: &mut PgConnection,
    board_id: Uuid,
) -> Result<Option<Board>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, name, created_at
        FROM boards
        WHERE id = $1
        "#,
    )
    .bind(board_id)
    .fetch_optional(conn)
    .await?;

    Ok(row.map(|r| Board {
        id: r.get("id"),
        name: r.get("name"),
        created_at: r.get("created_at"),
    }))
}

pub async fn board_exists(conn: &mut PgConnection, board_id: Uuid) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT 1 AS present FROM boards WHERE id = $1")
        .bind(board_id)
        .fetch_optional(conn)
        .await?;
    Ok(row.is_some())
}

fn column_from_row(row: &sqlx::postgres::PgRow) -> Result<Column, sqlx::Error> {
    Ok(Column {
        id: row.get("id"),
        board_id: row.get("board_id"),
        title: row.get("title"),
        rank: rank_from_row(row)?,
        created_at: row.get("created_at"),
    })
}

pub async fn fetch_column(
    conn: &mut PgConnection,
    column_id: Uuid,
) -> Result<Option<Column>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, board_id, title, rank_key, created_at
        FROM board_columns
        WHERE id = $1
        "#,
    )
    .bind(column_id)
    .fetch_optional(conn)
    .await?;

    row.map(|r| column_from_row(&r)).transpose()
}

/// All columns of a board in display order
pub async fn fetch_columns_ordered(
    conn: &mut PgConnection,
    board_id: Uuid,
) -> Result<Vec<Column>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, board_id, title, rank_key, created_at
        FROM board_columns
        WHERE board_id = $1
        ORDER BY rank_key, id
        "#,
    )
    .bind(board_id)
    .fetch_all(conn)
    .await?;

    rows.iter().map(column_from_row).collect()
}

pub async fn insert_column(conn: &mut PgConnection, column: &Column) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO board_columns (id, board_id, title, rank_key, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(column.id)
    .bind(column.board_id)
    .bind(&column.title)
    .bind(column.rank.as_str())
    .bind(column.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn update_column_rank(
    conn: &mut PgConnection,
    column_id: Uuid,
    rank: &RankKey,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE board_columns SET rank_key = $1 WHERE id = $2")
        .bind(rank.as_str())
        .bind(column_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Which of the given ids exist as columns, anywhere
pub async fn known_column_ids(
    conn: &mut PgConnection,
    ids: &[Uuid],
) -> Result<Vec<Uuid>, sqlx::Error> {
    let rows = sqlx::query("SELECT id FROM board_columns WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(conn)
        .await?;
    Ok(rows.iter().map(|r| r.get("id")).collect())
}

/// Which of the given ids exist as cards, anywhere
pub async fn known_card_ids(
    conn: &mut PgConnection,
    ids: &[Uuid],
) -> Result<Vec<Uuid>, sqlx::Error> {
    let rows = sqlx::query("SELECT id FROM cards WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(conn)
        .await?;
    Ok(rows.iter().map(|r| r.get("id")).collect())
}

fn card_from_row(row: &sqlx::postgres::PgRow) -> Result<Card, sqlx::Error> {
    Ok(Card {
        id: row.get("id"),
        column_id: row.get("column_id"),
        title: row.get("title"),
        description: row.get("description"),
        rank: rank_from_row(row)?,
        created_at: row.get("created_at"),
    })
}

pub async fn fetch_card(
    conn: &mut PgConnection,
    card_id: Uuid,
) -> Result<Option<Card>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, column_id, title, description, rank_key, created_at
        FROM cards
        WHERE id = $1
        "#,
    )
    .bind(card_id)
    .fetch_optional(conn)
    .await?;

    row.map(|r| card_from_row(&r)).transpose()
}

/// All cards of a column in display order
pub async fn fetch_cards_ordered(
    conn: &mut PgConnection,
    column_id: Uuid,
) -> Result<Vec<Card>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, column_id, title, description, rank_key, created_at
        FROM cards
        WHERE column_id = $1
        ORDER BY rank_key, id
        "#,
    )
    .bind(column_id)
    .fetch_all(conn)
    .await?;

    rows.iter().map(card_from_row).collect()
}

/// All cards of a board in one query, for the snapshot endpoint
pub async fn fetch_board_cards(
    conn: &mut PgConnection,
    board_id: Uuid,
) -> Result<Vec<Card>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT c.id, c.column_id, c.title, c.description, c.rank_key, c.created_at
        FROM cards c
        JOIN board_columns bc ON bc.id = c.column_id
        WHERE bc.board_id = $1
        ORDER BY c.rank_key, c.id
        "#,
    )
    .bind(board_id)
    .fetch_all(conn)
    .await?;

    rows.iter().map(card_from_row).collect()
}

pub async fn insert_card(conn: &mut PgConnection, card: &Card) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO cards (id, column_id, title, description, rank_key, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(card.id)
    .bind(card.column_id)
    .bind(&card.title)
    .bind(&card.description)
    .bind(card.rank.as_str())
    .bind(card.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Move a card: new owning column and new rank in one statement
pub async fn update_card_position(
    conn: &mut PgConnection,
    card_id: Uuid,
    column_id: Uuid,
    rank: &RankKey,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE cards SET column_id = $1, rank_key = $2 WHERE id = $3")
        .bind(column_id)
        .bind(rank.as_str())
        .bind(card_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn update_card_rank(
    conn: &mut PgConnection,
    card_id: Uuid,
    rank: &RankKey,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE cards SET rank_key = $1 WHERE id = $2")
        .bind(rank.as_str())
        .bind(card_id)
        .execute(conn)
        .await?;
    Ok(())
}
