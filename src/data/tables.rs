//! User and follows tables on disk
//!
//! CSV by default, Parquet when the path ends in `.parquet`. Every column
//! is read back as a string so ids keep their zero padding.

use std::fs::File;
use std::path::Path;

use anyhow::{anyhow, Result};
use polars::prelude::*;

use crate::data::users::UserProfile;

const USER_COLUMNS: [&str; 6] = ["userId", "username", "email", "name", "bio", "passwordHash"];
const FOLLOW_COLUMNS: [&str; 2] = ["followerId", "followeeId"];

fn is_parquet(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "parquet")
}

fn write_frame(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    if is_parquet(path) {
        ParquetWriter::new(file).finish(df)?;
    } else {
        CsvWriter::new(file).include_header(true).finish(df)?;
    }

    Ok(())
}

fn read_frame(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(anyhow!("File not found: {}", path.display()));
    }

    let df = if is_parquet(path) {
        LazyFrame::scan_parquet(path, Default::default())?.collect()?
    } else {
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?
    };

    Ok(df)
}

/// Values of a string column; empty cells read back as empty strings
fn string_column(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let column = df.column(name)?.str()?;

    Ok((0..df.height())
        .map(|i| column.get(i).unwrap_or_default().to_string())
        .collect())
}

fn column_of<'u>(users: &'u [UserProfile], field: impl Fn(&'u UserProfile) -> &'u str) -> Vec<&'u str> {
    users.iter().map(field).collect()
}

/// Write the user table
pub fn write_users<P: AsRef<Path>>(users: &[UserProfile], path: P) -> Result<()> {
    let path = path.as_ref();
    log::info!("Writing {} users to {}", users.len(), path.display());

    let mut df = df!(
        USER_COLUMNS[0] => column_of(users, |u| u.user_id.as_str()),
        USER_COLUMNS[1] => column_of(users, |u| u.username.as_str()),
        USER_COLUMNS[2] => column_of(users, |u| u.email.as_str()),
        USER_COLUMNS[3] => column_of(users, |u| u.name.as_str()),
        USER_COLUMNS[4] => column_of(users, |u| u.bio.as_str()),
        USER_COLUMNS[5] => column_of(users, |u| u.password_hash.as_str()),
    )?;

    write_frame(&mut df, path)
}

/// Read the user table, in file order
pub fn read_users<P: AsRef<Path>>(path: P) -> Result<Vec<UserProfile>> {
    let path = path.as_ref();
    log::info!("Reading users from {}", path.display());

    let df = read_frame(path)?;
    let mut columns = USER_COLUMNS
        .iter()
        .map(|name| string_column(&df, name).map(Vec::into_iter))
        .collect::<Result<Vec<_>>>()?;

    let users: Vec<UserProfile> = (0..df.height())
        .map(|_| {
            let mut field = |c: usize| columns[c].next().unwrap_or_default();
            UserProfile {
                user_id: field(0),
                username: field(1),
                email: field(2),
                name: field(3),
                bio: field(4),
                password_hash: field(5),
            }
        })
        .collect();

    log::info!("Loaded {} users", users.len());
    Ok(users)
}

/// Write the follows table; each pair is (followerId, followeeId)
pub fn write_follows<'a, P, I>(edges: I, path: P) -> Result<usize>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let path = path.as_ref();
    let (followers, followees): (Vec<&str>, Vec<&str>) = edges.into_iter().unzip();
    log::info!("Writing {} follow edges to {}", followers.len(), path.display());

    let count = followers.len();
    let mut df = df!(
        FOLLOW_COLUMNS[0] => followers,
        FOLLOW_COLUMNS[1] => followees,
    )?;

    write_frame(&mut df, path)?;
    Ok(count)
}

/// Read the follows table as (followerId, followeeId) pairs
pub fn read_follows<P: AsRef<Path>>(path: P) -> Result<Vec<(String, String)>> {
    let path = path.as_ref();
    log::info!("Reading follow edges from {}", path.display());

    let df = read_frame(path)?;
    let followers = string_column(&df, FOLLOW_COLUMNS[0])?;
    let followees = string_column(&df, FOLLOW_COLUMNS[1])?;

    log::info!("Loaded {} follow relationships", followers.len());
    Ok(followers.into_iter().zip(followees).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::users::generate_users;

    #[test]
    fn csv_tables_keep_zero_padded_ids() {
        let dir = tempfile::tempdir().unwrap();
        let users = generate_users(12, 3, "hash");
        let users_path = dir.path().join("users.csv");
        write_users(&users, &users_path).unwrap();
        assert_eq!(read_users(&users_path).unwrap(), users);

        let follows_path = dir.path().join("nested").join("follows.csv");
        let written = write_follows([("0001", "0002"), ("0010", "0001")], &follows_path).unwrap();
        assert_eq!(written, 2);
        assert_eq!(
            read_follows(&follows_path).unwrap(),
            vec![
                ("0001".to_string(), "0002".to_string()),
                ("0010".to_string(), "0001".to_string())
            ]
        );
    }

    #[test]
    fn parquet_follows_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("follows.parquet");
        write_follows([("0003", "0004")], &path).unwrap();
        assert_eq!(
            read_follows(&path).unwrap(),
            vec![("0003".to_string(), "0004".to_string())]
        );
    }

    #[test]
    fn missing_file_is_reported() {
        let err = read_follows("does/not/exist.csv").unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
