pub const CREATE_TABLE_ROWS: &str = r#"
CREATE TABLE IF NOT EXISTS table_rows (
    table_name TEXT   NOT NULL,
    row_index  BIGINT NOT NULL,
    cells      TEXT[] NOT NULL,
    PRIMARY KEY (table_name, row_index)
);
"#;

pub const INSERT_HEADER_ROW: &str = r#"
INSERT INTO table_rows (table_name, row_index, cells)
VALUES ($1, 0, $2)
ON CONFLICT (table_name, row_index) DO NOTHING;
"#;

pub const SELECT_TABLE_ROWS: &str = r#"
SELECT cells FROM table_rows WHERE table_name = $1 ORDER BY row_index;
"#;

pub const SELECT_MAX_ROW_INDEX: &str = r#"
SELECT MAX(row_index) FROM table_rows WHERE table_name = $1;
"#;

pub const INSERT_ROW: &str = r#"
INSERT INTO table_rows (table_name, row_index, cells) VALUES ($1, $2, $3);
"#;

pub const UPDATE_CELL: &str = r#"
UPDATE table_rows SET cells[$3::int] = $4 WHERE table_name = $1 AND row_index = $2;
"#;
