//! The stub virtual-table mechanism of §4.2.
//!
//! Each base table in the user schema is exposed in the mirror as an
//! instance of this module instead of a real, storage-backed table. Its
//! only job is to receive the planner's constraint/`ORDER BY` list for
//! each access path it considers (`xBestIndex`) and turn that into a
//! [`Scan`] appended to the shared [`ScanSink`]. It never actually returns
//! rows: `xFilter`/`xNext` immediately report end-of-table, since the
//! advisor never executes the workload, only plans it.

use std::cell::RefCell;
use std::os::raw::c_int;
use std::rc::Rc;

use advisor_core::types::ConstraintKind;
use advisor_core::{Constraint, Scan};
use rusqlite::ffi;
use rusqlite::vtab::{
    Context, CreateVTab, IndexConstraintOp, IndexInfo, VTab, VTabConnection, VTabCursor, VTabKind,
    Values,
};
use rusqlite::Result as SqliteResult;

use crate::tables::TableBits;

/// Shared, mutable state threaded through every stub instance registered
/// on one mirror connection. The orchestration layer (Schema Mirror /
/// Scan Extractor) sets `table_bits` before preparing each statement and
/// drains `scans` after.
#[derive(Default)]
pub struct ScanSink {
    pub table_bits: TableBits,
    pub scans: Vec<Scan>,
}

impl ScanSink {
    pub fn shared() -> Rc<RefCell<ScanSink>> {
        Rc::new(RefCell::new(ScanSink::default()))
    }

    /// Drains and returns every scan recorded since the last drain, in
    /// the order `xBestIndex` produced them (planner call order, per
    /// spec.md §5's ordering guarantee).
    pub fn drain(&mut self) -> Vec<Scan> {
        std::mem::take(&mut self.scans)
    }
}

/// One stub table instance: the column list it was declared with (so
/// `xBestIndex`/`xColumn` can map SQLite's 0-based column ordinals back
/// onto catalog column indexes), each column's declared collation (the
/// fallback used for `ORDER BY` terms, which SQLite does not surface a
/// planner-applied collation for), and a handle to the shared sink.
#[repr(C)]
pub struct StubTable {
    base: ffi::sqlite3_vtab,
    table_name: String,
    columns: Vec<String>,
    column_collations: Vec<String>,
    sink: Rc<RefCell<ScanSink>>,
}

impl StubTable {
    /// Returns the declared collation for `column_index`, or SQLite's
    /// default if the index is somehow out of range.
    fn column_collation(&self, column_index: usize) -> String {
        self.column_collations
            .get(column_index)
            .cloned()
            .unwrap_or_else(|| "BINARY".to_string())
    }
}

fn operator_to_kind(op: IndexConstraintOp) -> Option<ConstraintKind> {
    match op {
        IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_EQ => Some(ConstraintKind::Equality),
        IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_LT
        | IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_LE
        | IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_GT
        | IndexConstraintOp::SQLITE_INDEX_CONSTRAINT_GE => Some(ConstraintKind::Range),
        _ => None,
    }
}

unsafe impl<'vtab> VTab<'vtab> for StubTable {
    type Aux = Rc<RefCell<ScanSink>>;
    type Cursor = StubCursor<'vtab>;

    fn connect(
        db: &mut VTabConnection,
        aux: Option<&Self::Aux>,
        args: &[&[u8]],
    ) -> SqliteResult<(String, Self)> {
        // args: [module_name, db_name, table_name, column_list_csv], where
        // each entry of the csv is "name:collation" (see Mirror::open).
        let table_name = String::from_utf8_lossy(args[2]).into_owned();
        let column_list = args
            .get(3)
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .unwrap_or_default();

        let mut columns = Vec::new();
        let mut column_collations = Vec::new();
        for token in column_list.split(',') {
            let token = token.trim().trim_matches('\'');
            if token.is_empty() {
                continue;
            }
            let mut parts = token.splitn(2, ':');
            let name = parts.next().unwrap_or("").to_string();
            if name.is_empty() {
                continue;
            }
            let collation = parts.next().unwrap_or("BINARY").to_string();
            columns.push(name);
            column_collations.push(collation);
        }

        let quoted: Vec<String> = columns.iter().map(|c| format!("\"{c}\"")).collect();
        let schema = format!("CREATE TABLE x({})", quoted.join(", "));
        db.declare_vtab(&schema)?;

        let sink = aux
            .cloned()
            .expect("stub table module must be registered with a ScanSink aux");

        Ok((
            schema,
            StubTable {
                base: ffi::sqlite3_vtab::default(),
                table_name,
                columns,
                column_collations,
                sink,
            },
        ))
    }

    fn best_index(&self, info: &mut IndexInfo) -> SqliteResult<()> {
        let mut sink = self.sink.borrow_mut();
        let mask = sink.table_bits.dependency_mask_for(&self.table_name);

        let mut scan = Scan::new(self.table_name.clone(), sink.table_bits.own_bit(&self.table_name));

        let mut argv_index = 1;
        let constraints: Vec<_> = info.constraints().collect();
        for (i, constraint) in constraints.into_iter().enumerate() {
            if !constraint.is_usable() {
                continue;
            }
            let Some(kind) = operator_to_kind(constraint.operator()) else {
                continue;
            };
            let column_index = constraint.column() as usize;
            // `sqlite3_vtab_collation` (wrapped by `IndexInfo::collation`)
            // reports the collation the planner will actually apply to
            // this constraint, which may differ from the column's
            // declared collation when the predicate carries an explicit
            // `COLLATE` (S3). Fall back to the declared collation if the
            // lookup fails for any reason.
            let collation = info
                .collation(i)
                .map(str::to_string)
                .unwrap_or_else(|_| self.column_collation(column_index));
            let c = Constraint::new(column_index, collation, kind, mask, false);
            match kind {
                ConstraintKind::Equality => scan.push_equality(c),
                ConstraintKind::Range => scan.push_range(c),
                ConstraintKind::OrderBy => unreachable!("WHERE-clause operators never map to OrderBy"),
            }

            let mut usage = info.constraint_usage(i);
            usage.set_argv_index(argv_index);
            usage.set_omit(false);
            argv_index += 1;
        }

        // ORDER BY terms are appended in reverse source order by SQLite so
        // that iterating them in the order IndexInfo reports and pushing
        // each to the front would read left-to-right; since rusqlite's
        // order-by accessor already yields SQLite's own ordering, we push
        // in reverse to restore left-to-right source order in the Scan.
        // SQLite does not expose a planner-applied collation for `ORDER
        // BY` terms the way `sqlite3_vtab_collation` does for WHERE
        // constraints, so the column's own declared collation is the best
        // available answer (and is exact unless the query carries an
        // explicit `ORDER BY col COLLATE ...`, which this mirror cannot
        // observe).
        let orderbys: Vec<_> = info.order_bys().collect();
        for ob in orderbys.into_iter().rev() {
            let column_index = ob.column_index() as usize;
            let collation = self.column_collation(column_index);
            scan.push_orderby(Constraint::new(
                column_index,
                collation,
                ConstraintKind::OrderBy,
                mask,
                ob.is_order_by_desc(),
            ));
        }

        let cost = 1.0 / (1.0 + scan.equality().len() as f64 + scan.range().len() as f64);
        info.set_estimated_cost(cost);
        info.set_estimated_rows(1_000_000);

        sink.scans.push(scan);
        Ok(())
    }

    fn open(&mut self) -> SqliteResult<StubCursor<'_>> {
        Ok(StubCursor {
            base: ffi::sqlite3_vtab_cursor::default(),
            eof: true,
            phantom: std::marker::PhantomData,
        })
    }
}

impl<'vtab> CreateVTab<'vtab> for StubTable {
    const KIND: VTabKind = VTabKind::Default;
}

/// A cursor that immediately reports end-of-table: the advisor only
/// plans statements, it never steps them.
#[repr(C)]
pub struct StubCursor<'vtab> {
    base: ffi::sqlite3_vtab_cursor,
    eof: bool,
    phantom: std::marker::PhantomData<&'vtab StubTable>,
}

unsafe impl VTabCursor for StubCursor<'_> {
    fn filter(&mut self, _idx_num: c_int, _idx_str: Option<&str>, _args: &Values<'_>) -> SqliteResult<()> {
        self.eof = true;
        Ok(())
    }

    fn next(&mut self) -> SqliteResult<()> {
        Ok(())
    }

    fn eof(&self) -> bool {
        self.eof
    }

    fn column(&self, _ctx: &mut Context, _i: c_int) -> SqliteResult<()> {
        Ok(())
    }

    fn rowid(&self) -> SqliteResult<i64> {
        Ok(0)
    }
}
