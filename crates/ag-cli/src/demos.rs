//! Canned demo grammars for the CLI's positional-argument dispatch. The
//! text for `s1`, `s2`, and `s4` reproduces the worked examples given
//! verbatim in the project's analysis notes; `s3`, `s5`, and `s6` are
//! original grammars built to exhibit the same properties those notes
//! describe in prose (multi-group layering, an inter-group cycle resolved
//! by splitting, a realistic multi-attribute module grammar) since no
//! literal source text for those figures was available to reproduce.

pub fn lookup(name: &str) -> Option<&'static str> {
  match name {
    "s1" => Some(S1),
    "s2" => Some(S2),
    "s3" => Some(S3),
    "s4" => Some(S4),
    "s5" => Some(S5),
    "s6" => Some(S6),
    _ => None,
  }
}

const S1: &str = "\
A->BC : y[0]=z[2]; x[1]=x[0]; x[2]=y[1]; y[2]=x[2]
B->a
B->C : y[0]=z[1]; x[1]=x[0]
C->b : z[0]=y[0]
";

const S2: &str = "\
B->C : x[0]=x[1]; y[0]=y[1]
A->B
B->D : x[0]=y[1]; y[0]=x[1]
";

// A single production whose LHS accumulates a dependency chain deep enough
// to force several sequential groups, illustrating layered grouping even
// though the reference text-grammar's per-position kind convention (spec
// §6) keeps every attribute at one occurrence in a single effective kind —
// see DESIGN.md for why true kind alternation is exercised only by the
// ag-core test suite, which builds the Grammar directly rather than through
// this text format.
const S3: &str = "\
A->bcd : a0[0]=0; a1[0]=a0[0]; a2[0]=a1[0]; a3[0]=a2[0]; a4[0]=a3[0]; a5[0]=a4[0]
";

const S4: &str = "\
A->B : x[0]=0; x[1]=x[0]; y[0]=y[1]; y[1]=0
A->a
A->c
";

const S5: &str = "\
A->xB : p[0]=q[2]; r[2]=p[0]
A->xB : p[0]=0; r[2]=p[0]
B->y : q[0]=r[1]
B->z
";

const S6: &str = "\
L->SL : name[0]=name[1]; scope[1]=scope[0]; scope[2]=scope[0]
C->ML : type[0]=type[1]; scope[1]=scope[0]; entries[0]=entries[1]
";
