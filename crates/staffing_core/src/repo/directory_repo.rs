//! Directory Store: people, projects, skills and their associations.
//!
//! # Responsibility
//! - Register people and projects and attach skills to them.
//! - Serve deterministic read projections with nested skills.
//!
//! # Invariants
//! - Skill lookup is case-insensitive; the first spelling wins.
//! - Attaching a skill twice leaves exactly one association.
//! - Listings are ordered by id (insertion order); nested skills by skill id.
//! - No allocation policy lives here.

use crate::db::migrations::ensure_schema_ready;
use crate::model::person::{NewPerson, Person, PersonId};
use crate::model::project::{NewProject, Project, ProjectId, ProjectStatus};
use crate::model::skill::{normalize_skill_name, Skill, SkillId};
use crate::repo::error::{EntityRef, RepoError, RepoResult};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::BTreeMap;

const PERSON_SELECT_SQL: &str = "SELECT id, name, role, base_capacity FROM people";
const PROJECT_SELECT_SQL: &str = "SELECT id, name, description, status FROM projects";

/// Repository interface for the Directory Store.
pub trait DirectoryRepository {
    /// Registers a person. Fails with `Validation` on blank name/role.
    fn create_person(&self, request: &NewPerson) -> RepoResult<Person>;
    /// Registers a project with status `Active`.
    fn create_project(&self, request: &NewProject) -> RepoResult<Project>;
    /// Attaches a skill (created on first use) to a person.
    fn add_person_skill(&self, person_id: PersonId, skill_name: &str) -> RepoResult<Person>;
    /// Attaches a required skill (created on first use) to a project.
    fn add_project_skill(&self, project_id: ProjectId, skill_name: &str) -> RepoResult<Project>;
    /// Changes a project's lifecycle label.
    fn set_project_status(
        &self,
        project_id: ProjectId,
        status: ProjectStatus,
    ) -> RepoResult<Project>;
    fn get_person(&self, person_id: PersonId) -> RepoResult<Option<Person>>;
    fn get_project(&self, project_id: ProjectId) -> RepoResult<Option<Project>>;
    fn list_people(&self) -> RepoResult<Vec<Person>>;
    fn list_projects(&self) -> RepoResult<Vec<Project>>;
    fn list_skills(&self) -> RepoResult<Vec<Skill>>;
    /// Looks a skill up by case-insensitive name.
    fn find_skill(&self, skill_name: &str) -> RepoResult<Option<Skill>>;
    fn count_people(&self) -> RepoResult<u64>;
    fn count_projects(&self) -> RepoResult<u64>;
}

/// SQLite-backed Directory Store.
pub struct SqliteDirectoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDirectoryRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    /// Shorthand for registering a person with default capacity.
    pub fn create_person_named(&self, name: &str, role: &str) -> RepoResult<Person> {
        self.create_person(&NewPerson::new(name, role))
    }

    /// Shorthand for registering a project.
    pub fn create_project_named(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> RepoResult<Project> {
        self.create_project(&NewProject::new(name, description.map(str::to_string)))
    }
}

impl DirectoryRepository for SqliteDirectoryRepository<'_> {
    fn create_person(&self, request: &NewPerson) -> RepoResult<Person> {
        let (name, role, base_capacity) = request.validate()?;
        self.conn.execute(
            "INSERT INTO people (name, role, base_capacity) VALUES (?1, ?2, ?3);",
            params![name, role, base_capacity],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("event=person_create module=directory status=ok person_id={id}");

        Ok(Person {
            id,
            name: name.to_string(),
            role: role.to_string(),
            base_capacity,
            skills: Vec::new(),
        })
    }

    fn create_project(&self, request: &NewProject) -> RepoResult<Project> {
        let (name, description) = request.validate()?;
        let status = ProjectStatus::default();
        self.conn.execute(
            "INSERT INTO projects (name, description, status) VALUES (?1, ?2, ?3);",
            params![name, description, status.as_str()],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("event=project_create module=directory status=ok project_id={id}");

        Ok(Project {
            id,
            name: name.to_string(),
            description: description.to_string(),
            status,
            required_skills: Vec::new(),
        })
    }

    fn add_person_skill(&self, person_id: PersonId, skill_name: &str) -> RepoResult<Person> {
        let (display, key) = normalize_skill_name(skill_name)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !row_exists(&tx, "SELECT 1 FROM people WHERE id = ?1;", person_id)? {
            return Err(RepoError::NotFound(EntityRef::Person(person_id)));
        }
        let skill_id = resolve_or_create_skill(&tx, &display, &key)?;
        let linked = tx.execute(
            "INSERT OR IGNORE INTO person_skills (person_id, skill_id) VALUES (?1, ?2);",
            params![person_id, skill_id],
        )?;
        tx.commit()?;
        debug!(
            "event=person_skill_add module=directory status=ok person_id={person_id} skill_id={skill_id} linked={}",
            linked > 0
        );

        self.get_person(person_id)?
            .ok_or(RepoError::NotFound(EntityRef::Person(person_id)))
    }

    fn add_project_skill(&self, project_id: ProjectId, skill_name: &str) -> RepoResult<Project> {
        let (display, key) = normalize_skill_name(skill_name)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !row_exists(&tx, "SELECT 1 FROM projects WHERE id = ?1;", project_id)? {
            return Err(RepoError::NotFound(EntityRef::Project(project_id)));
        }
        let skill_id = resolve_or_create_skill(&tx, &display, &key)?;
        let linked = tx.execute(
            "INSERT OR IGNORE INTO project_skills (project_id, skill_id) VALUES (?1, ?2);",
            params![project_id, skill_id],
        )?;
        tx.commit()?;
        debug!(
            "event=project_skill_add module=directory status=ok project_id={project_id} skill_id={skill_id} linked={}",
            linked > 0
        );

        self.get_project(project_id)?
            .ok_or(RepoError::NotFound(EntityRef::Project(project_id)))
    }

    fn set_project_status(
        &self,
        project_id: ProjectId,
        status: ProjectStatus,
    ) -> RepoResult<Project> {
        let changed = self.conn.execute(
            "UPDATE projects
             SET
                status = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2;",
            params![status.as_str(), project_id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Project(project_id)));
        }

        self.get_project(project_id)?
            .ok_or(RepoError::NotFound(EntityRef::Project(project_id)))
    }

    fn get_person(&self, person_id: PersonId) -> RepoResult<Option<Person>> {
        let person = self
            .conn
            .query_row(
                &format!("{PERSON_SELECT_SQL} WHERE id = ?1;"),
                [person_id],
                |row| Ok(parse_person_row(row)),
            )
            .optional()?
            .transpose()?;

        let Some(mut person) = person else {
            return Ok(None);
        };
        person.skills = load_skills(
            self.conn,
            "SELECT s.id, s.name
             FROM person_skills ps
             JOIN skills s ON s.id = ps.skill_id
             WHERE ps.person_id = ?1
             ORDER BY s.id ASC;",
            person_id,
        )?;
        Ok(Some(person))
    }

    fn get_project(&self, project_id: ProjectId) -> RepoResult<Option<Project>> {
        let project = self
            .conn
            .query_row(
                &format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"),
                [project_id],
                |row| Ok(parse_project_row(row)),
            )
            .optional()?
            .transpose()?;

        let Some(mut project) = project else {
            return Ok(None);
        };
        project.required_skills = load_skills(
            self.conn,
            "SELECT s.id, s.name
             FROM project_skills ps
             JOIN skills s ON s.id = ps.skill_id
             WHERE ps.project_id = ?1
             ORDER BY s.id ASC;",
            project_id,
        )?;
        Ok(Some(project))
    }

    fn list_people(&self) -> RepoResult<Vec<Person>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PERSON_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut people = Vec::new();
        while let Some(row) = rows.next()? {
            people.push(parse_person_row(row)?);
        }

        let mut skills_by_owner = load_skill_links(
            self.conn,
            "SELECT ps.person_id, s.id, s.name
             FROM person_skills ps
             JOIN skills s ON s.id = ps.skill_id
             ORDER BY ps.person_id ASC, s.id ASC;",
        )?;
        for person in &mut people {
            person.skills = skills_by_owner.remove(&person.id).unwrap_or_default();
        }
        Ok(people)
    }

    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }

        let mut skills_by_owner = load_skill_links(
            self.conn,
            "SELECT ps.project_id, s.id, s.name
             FROM project_skills ps
             JOIN skills s ON s.id = ps.skill_id
             ORDER BY ps.project_id ASC, s.id ASC;",
        )?;
        for project in &mut projects {
            project.required_skills = skills_by_owner.remove(&project.id).unwrap_or_default();
        }
        Ok(projects)
    }

    fn list_skills(&self) -> RepoResult<Vec<Skill>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM skills ORDER BY id ASC;")?;
        let skills = stmt
            .query_map([], |row| {
                Ok(Skill {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(skills)
    }

    fn find_skill(&self, skill_name: &str) -> RepoResult<Option<Skill>> {
        let (_, key) = normalize_skill_name(skill_name)?;
        let skill = self
            .conn
            .query_row(
                "SELECT id, name FROM skills WHERE name_key = ?1;",
                [key],
                |row| {
                    Ok(Skill {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(skill)
    }

    fn count_people(&self) -> RepoResult<u64> {
        count_rows(self.conn, "SELECT COUNT(*) FROM people;")
    }

    fn count_projects(&self) -> RepoResult<u64> {
        count_rows(self.conn, "SELECT COUNT(*) FROM projects;")
    }
}

/// Returns the id of the skill with `key`, inserting it with `display` first
/// when absent.
fn resolve_or_create_skill(conn: &Connection, display: &str, key: &str) -> RepoResult<SkillId> {
    conn.execute(
        "INSERT OR IGNORE INTO skills (name, name_key) VALUES (?1, ?2);",
        params![display, key],
    )?;
    let skill_id = conn.query_row(
        "SELECT id FROM skills WHERE name_key = ?1;",
        [key],
        |row| row.get(0),
    )?;
    Ok(skill_id)
}

fn load_skills(conn: &Connection, sql: &str, owner_id: i64) -> RepoResult<Vec<Skill>> {
    let mut stmt = conn.prepare(sql)?;
    let skills = stmt
        .query_map([owner_id], |row| {
            Ok(Skill {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(skills)
}

/// Loads `(owner_id, skill_id, skill_name)` rows grouped by owner.
fn load_skill_links(conn: &Connection, sql: &str) -> RepoResult<BTreeMap<i64, Vec<Skill>>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([])?;
    let mut grouped: BTreeMap<i64, Vec<Skill>> = BTreeMap::new();
    while let Some(row) = rows.next()? {
        let owner_id: i64 = row.get(0)?;
        grouped.entry(owner_id).or_default().push(Skill {
            id: row.get(1)?,
            name: row.get(2)?,
        });
    }
    Ok(grouped)
}

pub(crate) fn row_exists(conn: &Connection, sql: &str, id: i64) -> RepoResult<bool> {
    let found = conn
        .query_row(sql, [id], |_| Ok(()))
        .optional()?
        .is_some();
    Ok(found)
}

pub(crate) fn count_rows(conn: &Connection, sql: &str) -> RepoResult<u64> {
    let count: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    u64::try_from(count).map_err(|_| RepoError::InvalidData(format!("negative row count {count}")))
}

fn parse_person_row(row: &Row<'_>) -> RepoResult<Person> {
    let id: PersonId = row.get("id")?;
    let raw_capacity: i64 = row.get("base_capacity")?;
    let base_capacity = u8::try_from(raw_capacity)
        .ok()
        .filter(|value| (1..=100).contains(value))
        .ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid base_capacity `{raw_capacity}` in people.base_capacity for id {id}"
            ))
        })?;

    Ok(Person {
        id,
        name: row.get("name")?,
        role: row.get("role")?,
        base_capacity,
        skills: Vec::new(),
    })
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let id: ProjectId = row.get("id")?;
    let status_text: String = row.get("status")?;
    let status = ProjectStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid project status `{status_text}` in projects.status for id {id}"
        ))
    })?;

    Ok(Project {
        id,
        name: row.get("name")?,
        description: row.get("description")?,
        status,
        required_skills: Vec::new(),
    })
}
