//! The runtime library linked into every compiled program.
//!
//! The built-in procedures seeded into the global scope resolve directly to
//! the definitions in this block, so the block is appended to every output
//! whether or not the program calls any of them.

/// IR text of the runtime library.
pub const RUNTIME_LIBRARY: &str = r#"; The following is the runtime library shared by every compiled program

; Imports from the C standard library
declare i32 @printf(i8* nocapture, ...)
declare i32 @scanf(i8* nocapture, ...)
declare float @llvm.sqrt.f32(float)

; Shared constants
@str.empty = private constant [128 x i8] zeroinitializer
@str.true = private constant [5 x i8] c"True\00"
@str.false = private constant [6 x i8] c"False\00"
@str.int = private constant [3 x i8] c"%i\00"
@str.floatf = private constant [3 x i8] c"%f\00"
@str.floate = private constant [3 x i8] c"%e\00"
@str.readstr = private constant [6 x i8] c"%127s\00"
@str.inbuf = private global [128 x i8] zeroinitializer

; Writes a boolean
define private i1 @putBool(i1 %bool) {
    br i1 %bool, label %true, label %false

    true:
    %ptr1 = getelementptr [5 x i8], [5 x i8]* @str.true, i32 0, i32 0
    %retInt1 = call i32 (i8*, ...) @printf(i8* %ptr1)
    %ret1 = icmp sge i32 %retInt1, 0
    ret i1 %ret1

    false:
    %ptr0 = getelementptr [6 x i8], [6 x i8]* @str.false, i32 0, i32 0
    %retInt0 = call i32 (i8*, ...) @printf(i8* %ptr0)
    %ret0 = icmp sge i32 %retInt0, 0
    ret i1 %ret0
}

; Writes an integer
define private i1 @putInteger(i32 %int) {
    %ptr = getelementptr [3 x i8], [3 x i8]* @str.int, i32 0, i32 0
    %retInt = call i32 (i8*, ...) @printf(i8* %ptr, i32 %int)
    %ret = icmp sge i32 %retInt, 0
    ret i1 %ret
}

; Writes a floating-point number. Numbers 6 orders of magnitude above or
; below 1 are printed in scientific notation.
define private i1 @putFloat(float %float) {
    %min = fdiv float 1.0, 1.0e+6
    %cond0 = fcmp ole float %float, %min
    %cond1 = fcmp oge float %float, 1.0e+6
    %cond = or i1 %cond0, %cond1
    %ptrf = getelementptr [3 x i8], [3 x i8]* @str.floatf, i32 0, i32 0
    %ptre = getelementptr [3 x i8], [3 x i8]* @str.floate, i32 0, i32 0
    %ptr = select i1 %cond, i8* %ptre, i8* %ptrf

    %double = fpext float %float to double
    %retInt = call i32 (i8*, ...) @printf(i8* %ptr, double %double)
    %ret = icmp sge i32 %retInt, 0
    ret i1 %ret
}

; Writes a string
define private i1 @putString(i8* %str) {
    %retInt = call i32 (i8*, ...) @printf(i8* %str)
    %ret = icmp sge i32 %retInt, 0
    ret i1 %ret
}

; Reads an integer
define private i32 @getInteger() {
    %ptr = alloca i32
    store i32 0, i32* %ptr
    %fmt = getelementptr [3 x i8], [3 x i8]* @str.int, i32 0, i32 0
    call i32 (i8*, ...) @scanf(i8* %fmt, i32* %ptr)
    %val = load i32, i32* %ptr
    ret i32 %val
}

; Reads a floating-point number
define private float @getFloat() {
    %ptr = alloca float
    store float 0.0, float* %ptr
    %fmt = getelementptr [3 x i8], [3 x i8]* @str.floatf, i32 0, i32 0
    call i32 (i8*, ...) @scanf(i8* %fmt, float* %ptr)
    %val = load float, float* %ptr
    ret float %val
}

; Reads a boolean: zero is false, anything else is true
define private i1 @getBool() {
    %int = call i32 @getInteger()
    %ret = icmp ne i32 %int, 0
    ret i1 %ret
}

; Reads a string into the shared input buffer
define private i8* @getString() {
    %fmt = getelementptr [6 x i8], [6 x i8]* @str.readstr, i32 0, i32 0
    %buf = getelementptr [128 x i8], [128 x i8]* @str.inbuf, i32 0, i32 0
    call i32 (i8*, ...) @scanf(i8* %fmt, i8* %buf)
    ret i8* %buf
}

; Square root of an integer
define private float @sqrtInt(i32 %int) {
    %float = sitofp i32 %int to float
    %root = call float @llvm.sqrt.f32(float %float)
    ret float %root
}

; Compares two strings for equality, byte by byte
define private i1 @str.eq(i8* %l, i8* %r) {
    entry:
    br label %loop

    loop:
    %index = phi i32 [ 0, %entry ], [ %next, %step ]
    %lptr = getelementptr i8, i8* %l, i32 %index
    %rptr = getelementptr i8, i8* %r, i32 %index
    %lchar = load i8, i8* %lptr
    %rchar = load i8, i8* %rptr
    %same = icmp eq i8 %lchar, %rchar
    br i1 %same, label %step, label %differ

    step:
    %done = icmp eq i8 %lchar, 0
    %next = add i32 %index, 1
    br i1 %done, label %match, label %loop

    match:
    ret i1 true

    differ:
    ret i1 false
}
"#;

/// IR names of the runtime routines backing the built-in procedures, in the
/// order the scope manager seeds them. Kept next to the library text so the
/// two cannot drift apart silently.
pub const GET_BOOL: &str = "@getBool";
pub const GET_INTEGER: &str = "@getInteger";
pub const GET_FLOAT: &str = "@getFloat";
pub const GET_STRING: &str = "@getString";
pub const PUT_BOOL: &str = "@putBool";
pub const PUT_INTEGER: &str = "@putInteger";
pub const PUT_FLOAT: &str = "@putFloat";
pub const PUT_STRING: &str = "@putString";
pub const SQRT: &str = "@sqrtInt";
pub const STRING_EQ: &str = "@str.eq";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_library_defines_every_builtin_routine() {
        let routines = [
            GET_BOOL,
            GET_INTEGER,
            GET_FLOAT,
            GET_STRING,
            PUT_BOOL,
            PUT_INTEGER,
            PUT_FLOAT,
            PUT_STRING,
            SQRT,
            STRING_EQ,
        ];
        for routine in routines {
            assert!(
                RUNTIME_LIBRARY.contains(&format!("{}(", routine)),
                "missing runtime routine {}",
                routine
            );
        }
    }

    #[test]
    fn runtime_library_defines_empty_string_sentinel() {
        assert!(RUNTIME_LIBRARY.contains("@str.empty"));
    }
}
