//! Parity-only C API (spec.md §6), gated behind the `capi` feature.
//!
//! This is not the primary surface — see [`crate::Session`] for the
//! idiomatic Rust API every function here thinly wraps. It exists only
//! so a caller that genuinely needs the illustrative `expert_*` names
//! from spec.md §6 has them, returning status codes plus a caller-owned
//! `CString` diagnostic (via [`expert_errmsg`]/[`expert_free_string`])
//! per the error-propagation policy of spec.md §7.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;

use crate::config::AdvisorConfig;
use crate::report::ReportKind;
use crate::session::Session;

const STATUS_OK: c_int = 0;
const STATUS_ERROR: c_int = 1;
const STATUS_MISUSE: c_int = 2;

/// Opaque handle returned by [`expert_new`]. Owns the `Session` (absent
/// only when construction itself failed — see below), the most recently
/// returned report string (so `expert_report` can hand out a pointer the
/// caller does not need to free), and the diagnostic from the most
/// recently failed call.
pub struct ExpertSession {
    session: Option<Session>,
    last_report: Option<CString>,
    last_error: Option<CString>,
}

impl ExpertSession {
    fn set_error(&mut self, err: &advisor_core::Error) {
        self.last_error = CString::new(err.to_string()).ok();
    }
}

/// Opens `db_path` and creates a session with default configuration.
///
/// Returns a null pointer only when `db_path` itself is unusable (null or
/// not valid UTF-8/NUL-terminated) — there is no handle to attach a
/// diagnostic to in that case. If `Session::create` itself fails (e.g. the
/// database cannot be opened), a handle is still returned so the caller
/// can retrieve the reason via [`expert_errmsg`], mirroring how
/// `sqlite3_open_v2` hands back a usable-for-diagnostics handle even on
/// failure; every other call against such a handle reports
/// [`STATUS_MISUSE`].
///
/// # Safety
/// `db_path` must be a valid, NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn expert_new(db_path: *const c_char) -> *mut ExpertSession {
    if db_path.is_null() {
        return ptr::null_mut();
    }
    let Ok(path) = CStr::from_ptr(db_path).to_str() else {
        return ptr::null_mut();
    };
    match Session::create(path, AdvisorConfig::default()) {
        Ok(session) => Box::into_raw(Box::new(ExpertSession {
            session: Some(session),
            last_report: None,
            last_error: None,
        })),
        Err(err) => {
            let mut handle = ExpertSession {
                session: None,
                last_report: None,
                last_error: None,
            };
            handle.set_error(&err);
            Box::into_raw(Box::new(handle))
        }
    }
}

/// Submits `sql` to the session. Returns a status code (0 ok, 1 error,
/// 2 misuse). On error, the diagnostic is retrievable via
/// [`expert_errmsg`].
///
/// # Safety
/// `session` must be a live pointer returned by [`expert_new`]; `sql`
/// must be a valid, NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn expert_sql(session: *mut ExpertSession, sql: *const c_char) -> c_int {
    let Some(session) = session.as_mut() else {
        return STATUS_MISUSE;
    };
    let Some(inner) = session.session.as_mut() else {
        return STATUS_MISUSE;
    };
    let Ok(sql) = CStr::from_ptr(sql).to_str() else {
        return STATUS_ERROR;
    };
    match inner.submit_sql(sql) {
        Ok(()) => STATUS_OK,
        Err(err @ advisor_core::Error::MisuseError) => {
            session.set_error(&err);
            STATUS_MISUSE
        }
        Err(err) => {
            session.set_error(&err);
            STATUS_ERROR
        }
    }
}

/// Runs `analyze`. Returns a status code (0 ok, 1 error, 2 misuse). On
/// error, the diagnostic is retrievable via [`expert_errmsg`].
///
/// # Safety
/// `session` must be a live pointer returned by [`expert_new`].
#[no_mangle]
pub unsafe extern "C" fn expert_analyze(session: *mut ExpertSession) -> c_int {
    let Some(session) = session.as_mut() else {
        return STATUS_MISUSE;
    };
    let Some(inner) = session.session.as_mut() else {
        return STATUS_MISUSE;
    };
    match inner.analyze() {
        Ok(()) => STATUS_OK,
        Err(err @ advisor_core::Error::MisuseError) => {
            session.set_error(&err);
            STATUS_MISUSE
        }
        Err(err) => {
            session.set_error(&err);
            STATUS_ERROR
        }
    }
}

/// Returns the diagnostic from the most recently failed call on `session`
/// as a **caller-owned** string: the caller takes ownership and must
/// release it with [`expert_free_string`], unlike [`expert_report`]'s
/// session-owned borrow. Returns null if there is no live handle or no
/// diagnostic has been recorded yet.
///
/// # Safety
/// `session` must be a live pointer returned by [`expert_new`] (including
/// one returned after `Session::create` itself failed).
#[no_mangle]
pub unsafe extern "C" fn expert_errmsg(session: *mut ExpertSession) -> *mut c_char {
    let Some(session) = session.as_ref() else {
        return ptr::null_mut();
    };
    match &session.last_error {
        Some(msg) => msg.clone().into_raw(),
        None => ptr::null_mut(),
    }
}

/// Releases a string previously returned by [`expert_errmsg`].
///
/// # Safety
/// `msg` must either be null or a pointer previously returned by
/// [`expert_errmsg`] on this process, not yet freed.
#[no_mangle]
pub unsafe extern "C" fn expert_free_string(msg: *mut c_char) {
    if !msg.is_null() {
        drop(CString::from_raw(msg));
    }
}

/// Returns the number of submitted statements, or 0 for a null handle.
///
/// # Safety
/// `session` must be a live pointer returned by [`expert_new`].
#[no_mangle]
pub unsafe extern "C" fn expert_count(session: *mut ExpertSession) -> u32 {
    match session.as_ref().and_then(|s| s.session.as_ref()) {
        Some(inner) => inner.statement_count(),
        None => 0,
    }
}

/// Returns the requested report as a borrowed, NUL-terminated string
/// owned by `session`, or a null pointer if unavailable.
///
/// `kind`: 0 = SQL, 1 = INDEXES, 2 = PLAN, 3 = CANDIDATES.
///
/// # Safety
/// `session` must be a live pointer returned by [`expert_new`]. The
/// returned pointer is invalidated by the next `expert_report` call on
/// the same session, or by [`expert_destroy`]; the caller must not free
/// it directly.
#[no_mangle]
pub unsafe extern "C" fn expert_report(
    session: *mut ExpertSession,
    statement_id: u32,
    kind: c_int,
) -> *const c_char {
    let Some(session) = session.as_mut() else {
        return ptr::null();
    };
    let Some(inner) = session.session.as_mut() else {
        return ptr::null();
    };
    let kind = match kind {
        0 => ReportKind::Sql,
        1 => ReportKind::Indexes,
        2 => ReportKind::Plan,
        3 => ReportKind::Candidates,
        _ => return ptr::null(),
    };
    match inner
        .report(statement_id, kind)
        .and_then(|text| CString::new(text).ok())
    {
        Some(cstring) => {
            session.last_report = Some(cstring);
            session.last_report.as_ref().unwrap().as_ptr()
        }
        None => ptr::null(),
    }
}

/// Releases the session and every string it has handed out.
///
/// # Safety
/// `session` must be a live pointer returned by [`expert_new`], not
/// already destroyed.
#[no_mangle]
pub unsafe extern "C" fn expert_destroy(session: *mut ExpertSession) {
    if !session.is_null() {
        drop(Box::from_raw(session));
    }
}
