/// Primary keys of the `human` table are MariaDB `BIGINT AUTO_INCREMENT`.
pub type DbId = i64;
