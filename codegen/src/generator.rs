//! The code generator.
//!
//! Holds the monotonic name counters and the output buffers, and exposes one
//! operation per semantic action the parser performs. Every operation
//! appends to the current buffer, which is the top of the in-progress
//! procedure stack when a procedure body is being parsed and the program
//! entry point otherwise.
//!
//! The generator assumes the parser has already validated types and array
//! sizes; it never reports a semantic error.

use std::fmt;
use std::fmt::Write;

use log::trace;
use pasc_dsl::symbol::{DataType, Symbol};

use crate::stdlib;

/// A value handle: the text of an SSA register or an immediate constant,
/// usable wherever the IR expects an operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reg(String);

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A basic block label handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLabel(String);

impl fmt::Display for BlockLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Addition-level operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
}

/// Multiplication-level operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermOp {
    Mul,
    Div,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationOp {
    Eq,
    Ne,
    Gt,
    GtEq,
    Lt,
    LtEq,
}

/// Bitwise operators. Booleans are 0/1 integers by the time these run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitwiseOp {
    And,
    Or,
}

/// Generates the output program one instruction at a time.
pub struct Generator {
    register_count: usize,
    global_count: usize,
    local_count: usize,
    procedure_count: usize,
    label_count: usize,
    string_count: usize,
    /// Module-level globals and string constants.
    globals: String,
    /// Body of the program entry point.
    entry: String,
    /// Bodies of procedures currently being generated, innermost last.
    in_progress: Vec<String>,
    /// Completed procedure definitions.
    finished: Vec<String>,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    pub fn new() -> Self {
        Self {
            register_count: 0,
            global_count: 0,
            local_count: 0,
            procedure_count: 0,
            label_count: 0,
            string_count: 0,
            globals: String::new(),
            entry: String::new(),
            in_progress: Vec::new(),
            finished: Vec::new(),
        }
    }

    /// Assembles the final program text: globals, the entry point, every
    /// finished procedure, and the runtime library.
    pub fn finish(self) -> String {
        debug_assert!(self.in_progress.is_empty());
        let mut output = String::new();
        output.push_str(&self.globals);
        output.push('\n');
        output.push_str("define i32 @main() {\n");
        output.push_str(&self.entry);
        output.push_str("\tret i32 0\n}\n\n");
        for procedure in &self.finished {
            output.push_str(procedure);
            output.push('\n');
        }
        output.push_str(stdlib::RUNTIME_LIBRARY);
        output
    }

    fn next_register(&mut self) -> Reg {
        let register = Reg(format!("%r{}", self.register_count));
        self.register_count += 1;
        register
    }

    fn next_label(&mut self, stem: &str) -> BlockLabel {
        let label = BlockLabel(format!("{}{}", stem, self.label_count));
        self.label_count += 1;
        label
    }

    fn buffer(&mut self) -> &mut String {
        self.in_progress.last_mut().unwrap_or(&mut self.entry)
    }

    /// The IR spelling of a data type; array size 0 means scalar.
    fn ir_type(data_type: DataType, array_size: u32) -> String {
        let scalar = match data_type {
            DataType::Bool => "i1",
            DataType::Integer => "i32",
            DataType::Float => "float",
            DataType::String => "i8*",
        };
        if array_size == 0 {
            scalar.to_string()
        } else {
            format!("[{} x {}]", array_size, scalar)
        }
    }

    /// The zero value each scalar type defaults to. String slots point at
    /// the shared empty buffer so every string is always printable.
    fn zero_value(data_type: DataType) -> &'static str {
        match data_type {
            DataType::Bool => "false",
            DataType::Integer => "0",
            DataType::Float => "0.0",
            DataType::String => {
                "getelementptr inbounds ([128 x i8], [128 x i8]* @str.empty, i32 0, i32 0)"
            }
        }
    }

    /// Writes a comment line into the current buffer.
    pub fn comment(&mut self, text: &str) {
        let buffer = self.buffer();
        writeln!(buffer, "\t; {}", text).unwrap();
    }

    /// Emits a zero-initialized slot for the variable and returns the name
    /// chosen for it. Globals become module globals; locals are stack
    /// allocations in the current procedure.
    pub fn declare_variable(&mut self, symbol: &Symbol, is_global: bool) -> String {
        let data_type = Self::ir_type(symbol.data_type(), symbol.array_size());
        if is_global {
            let name = format!("@g{}_{}", self.global_count, symbol.name().original());
            self.global_count += 1;
            let initializer = if symbol.is_array() {
                "zeroinitializer".to_string()
            } else {
                Self::zero_value(symbol.data_type()).to_string()
            };
            writeln!(self.globals, "{} = global {} {}", name, data_type, initializer).unwrap();
            trace!("Declared global slot {}", name);
            name
        } else {
            let name = format!("%l{}_{}", self.local_count, symbol.name().original());
            self.local_count += 1;
            let initializer = if symbol.is_array() {
                "zeroinitializer".to_string()
            } else {
                Self::zero_value(symbol.data_type()).to_string()
            };
            let buffer = self.buffer();
            writeln!(buffer, "\t{} = alloca {}", name, data_type).unwrap();
            writeln!(buffer, "\tstore {} {}, {}* {}", data_type, initializer, data_type, name)
                .unwrap();
            trace!("Declared local slot {}", name);
            name
        }
    }

    /// Opens a procedure definition. Assigns the procedure its IR name,
    /// pushes a fresh body buffer, and copies each incoming argument into a
    /// dedicated local slot so parameters behave like any other variable.
    pub fn start_procedure(&mut self, procedure: &mut Symbol) {
        let name = format!("@p{}_{}", self.procedure_count, procedure.name().original());
        self.procedure_count += 1;

        let mut body = String::new();
        let return_type = Self::ir_type(procedure.data_type(), 0);
        write!(body, "define private {} {}(", return_type, name).unwrap();
        for (index, parameter) in procedure.parameters().iter().enumerate() {
            if index > 0 {
                body.push_str(", ");
            }
            let data_type = Self::ir_type(parameter.data_type(), parameter.array_size());
            write!(body, "{} %arg{}", data_type, index).unwrap();
        }
        body.push_str(") {\n");

        // Arguments are copied into slots so that assignments to parameters
        // go through the same load/store path as every other variable.
        for (index, parameter) in procedure.parameters_mut().iter_mut().enumerate() {
            let slot = format!("%a{}_{}", self.local_count, parameter.name().original());
            self.local_count += 1;
            let data_type = Self::ir_type(parameter.data_type(), parameter.array_size());
            writeln!(body, "\t{} = alloca {}", slot, data_type).unwrap();
            writeln!(body, "\tstore {} %arg{}, {}* {}", data_type, index, data_type, slot).unwrap();
            parameter.ir_name = Some(slot);
        }

        procedure.ir_name = Some(name);
        self.in_progress.push(body);
    }

    /// Closes the procedure opened by the matching [`Generator::start_procedure`].
    /// A type-appropriate default return covers control paths that never
    /// reach an explicit `RETURN`.
    pub fn finish_procedure(&mut self, procedure: &Symbol) {
        let mut body = self.in_progress.pop().expect("no procedure in progress");
        let return_type = Self::ir_type(procedure.data_type(), 0);
        writeln!(body, "\tret {} {}", return_type, Self::zero_value(procedure.data_type()))
            .unwrap();
        body.push_str("}\n");
        self.finished.push(body);
    }

    /// An integer literal is its own operand text.
    pub fn const_int(value: i32) -> Reg {
        Reg(value.to_string())
    }

    /// A boolean literal is its own operand text.
    pub fn const_bool(value: bool) -> Reg {
        Reg(if value { "true" } else { "false" }.to_string())
    }

    /// Floating-point immediates are spelled as the hexadecimal form of the
    /// double whose low mantissa bits are zero, which is the only portable
    /// text form for single-precision constants.
    pub fn const_float(value: f64) -> Reg {
        let bits = (value as f32 as f64).to_bits();
        Reg(format!("0x{:09X}0000000", bits >> 28))
    }

    /// Materializes a string literal: a private 128-byte NUL-padded module
    /// constant, referenced through a constant element pointer.
    pub fn const_string(&mut self, value: &str) -> Reg {
        let name = format!("@s{}", self.string_count);
        self.string_count += 1;

        // Escape sequences pass through to the output two characters wide
        // but stand for a single byte.
        let escapes = value.matches('\\').count();
        let content_len = value.len() - escapes;
        let padding = 128usize.saturating_sub(content_len);
        let mut constant = String::with_capacity(value.len() + padding * 3);
        constant.push_str(value);
        for _ in 0..padding {
            constant.push_str("\\00");
        }
        writeln!(
            self.globals,
            "{} = private constant [128 x i8] c\"{}\"",
            name, constant
        )
        .unwrap();
        Reg(format!(
            "getelementptr inbounds ([128 x i8], [128 x i8]* {}, i32 0, i32 0)",
            name
        ))
    }

    /// Arithmetic negation, elementwise over arrays.
    pub fn negate(&mut self, value: &Reg, data_type: DataType, array_size: u32) -> Reg {
        let result = self.next_register();
        let ir_type = Self::ir_type(data_type, array_size);
        match data_type {
            DataType::Float => {
                let buffer = self.buffer();
                writeln!(buffer, "\t{} = fneg {} {}", result, ir_type, value).unwrap();
            }
            DataType::Integer => {
                let factor = if array_size == 0 {
                    "-1".to_string()
                } else {
                    let elements = vec!["i32 -1"; array_size as usize];
                    format!("[{}]", elements.join(", "))
                };
                let buffer = self.buffer();
                writeln!(buffer, "\t{} = mul {} {}, {}", result, ir_type, value, factor).unwrap();
            }
            _ => unreachable!("negation is only generated for numeric operands"),
        }
        result
    }

    /// Bitwise complement of an integer, elementwise over arrays.
    pub fn complement(&mut self, value: &Reg, array_size: u32) -> Reg {
        let result = self.next_register();
        let ir_type = Self::ir_type(DataType::Integer, array_size);
        let mask = if array_size == 0 {
            "-1".to_string()
        } else {
            let elements = vec!["i32 -1"; array_size as usize];
            format!("[{}]", elements.join(", "))
        };
        let buffer = self.buffer();
        writeln!(buffer, "\t{} = xor {} {}, {}", result, ir_type, value, mask).unwrap();
        result
    }

    /// Shared lowering for all binary operators.
    ///
    /// Equal array sizes produce one instruction on the common type. When
    /// exactly one operand is an array the scalar is broadcast with an
    /// unrolled extract-compute-insert sequence, low to high.
    fn binary(
        &mut self,
        opcode: &str,
        operand_type: DataType,
        produces_bool: bool,
        left: &Reg,
        left_size: u32,
        right: &Reg,
        right_size: u32,
    ) -> Reg {
        let result_type = if produces_bool {
            DataType::Bool
        } else {
            operand_type
        };
        if left_size == right_size {
            let result = self.next_register();
            let ir_type = Self::ir_type(operand_type, left_size);
            let buffer = self.buffer();
            writeln!(buffer, "\t{} = {} {} {}, {}", result, opcode, ir_type, left, right).unwrap();
            return result;
        }

        let (vector, scalar, size, scalar_on_left) = if left_size != 0 {
            (left, right, left_size, false)
        } else {
            (right, left, right_size, true)
        };
        let vector_type = Self::ir_type(operand_type, size);
        let element_type = Self::ir_type(operand_type, 0);
        let result_vector_type = Self::ir_type(result_type, size);
        let result_element_type = Self::ir_type(result_type, 0);

        let mut accumulated = Reg("undef".to_string());
        for index in 0..size {
            let element = self.next_register();
            let computed = self.next_register();
            let inserted = self.next_register();
            let (l, r) = if scalar_on_left {
                (scalar, &element)
            } else {
                (&element, scalar)
            };
            let buffer = self.buffer();
            writeln!(
                buffer,
                "\t{} = extractvalue {} {}, {}",
                element, vector_type, vector, index
            )
            .unwrap();
            writeln!(buffer, "\t{} = {} {} {}, {}", computed, opcode, element_type, l, r).unwrap();
            writeln!(
                buffer,
                "\t{} = insertvalue {} {}, {} {}, {}",
                inserted, result_vector_type, accumulated, result_element_type, computed, index
            )
            .unwrap();
            accumulated = inserted;
        }
        accumulated
    }

    /// Multiplies or divides two numeric values.
    pub fn term(
        &mut self,
        operation: TermOp,
        data_type: DataType,
        left: &Reg,
        left_size: u32,
        right: &Reg,
        right_size: u32,
    ) -> Reg {
        let opcode = match (operation, data_type) {
            (TermOp::Mul, DataType::Integer) => "mul",
            (TermOp::Div, DataType::Integer) => "sdiv",
            (TermOp::Mul, DataType::Float) => "fmul",
            (TermOp::Div, DataType::Float) => "fdiv",
            _ => unreachable!("term operands are always numeric"),
        };
        self.binary(opcode, data_type, false, left, left_size, right, right_size)
    }

    /// Adds or subtracts two numeric values.
    pub fn arith(
        &mut self,
        operation: ArithOp,
        data_type: DataType,
        left: &Reg,
        left_size: u32,
        right: &Reg,
        right_size: u32,
    ) -> Reg {
        let opcode = match (operation, data_type) {
            (ArithOp::Add, DataType::Integer) => "add",
            (ArithOp::Sub, DataType::Integer) => "sub",
            (ArithOp::Add, DataType::Float) => "fadd",
            (ArithOp::Sub, DataType::Float) => "fsub",
            _ => unreachable!("arithmetic operands are always numeric"),
        };
        self.binary(opcode, data_type, false, left, left_size, right, right_size)
    }

    /// Compares two values of the given operand type. The result is boolean
    /// with the reconciled array size.
    pub fn relation(
        &mut self,
        operation: RelationOp,
        operand_type: DataType,
        left: &Reg,
        left_size: u32,
        right: &Reg,
        right_size: u32,
    ) -> Reg {
        let opcode = match (operation, operand_type) {
            (RelationOp::Eq, DataType::Bool) => "icmp eq",
            (RelationOp::Ne, DataType::Bool) => "icmp ne",
            (RelationOp::Gt, DataType::Bool) => "icmp ugt",
            (RelationOp::Lt, DataType::Bool) => "icmp ult",
            (RelationOp::GtEq, DataType::Bool) => "icmp uge",
            (RelationOp::LtEq, DataType::Bool) => "icmp ule",
            (RelationOp::Eq, DataType::Integer) => "icmp eq",
            (RelationOp::Ne, DataType::Integer) => "icmp ne",
            (RelationOp::Gt, DataType::Integer) => "icmp sgt",
            (RelationOp::Lt, DataType::Integer) => "icmp slt",
            (RelationOp::GtEq, DataType::Integer) => "icmp sge",
            (RelationOp::LtEq, DataType::Integer) => "icmp sle",
            (RelationOp::Eq, DataType::Float) => "fcmp oeq",
            (RelationOp::Ne, DataType::Float) => "fcmp one",
            (RelationOp::Gt, DataType::Float) => "fcmp ogt",
            (RelationOp::Lt, DataType::Float) => "fcmp olt",
            (RelationOp::GtEq, DataType::Float) => "fcmp oge",
            (RelationOp::LtEq, DataType::Float) => "fcmp ole",
            _ => unreachable!("string relations are routed to the runtime library"),
        };
        self.binary(opcode, operand_type, true, left, left_size, right, right_size)
    }

    /// Compares two strings through the runtime helper. Only equality and
    /// inequality reach this point.
    pub fn relation_string(&mut self, operation: RelationOp, left: &Reg, right: &Reg) -> Reg {
        let equal = self.next_register();
        let buffer = self.buffer();
        writeln!(
            buffer,
            "\t{} = call i1 {}(i8* {}, i8* {})",
            equal,
            stdlib::STRING_EQ,
            left,
            right
        )
        .unwrap();
        match operation {
            RelationOp::Eq => equal,
            RelationOp::Ne => {
                let inverted = self.next_register();
                let buffer = self.buffer();
                writeln!(buffer, "\t{} = xor i1 {}, true", inverted, equal).unwrap();
                inverted
            }
            _ => unreachable!("only equality relations apply to strings"),
        }
    }

    /// Bitwise AND/OR over integers.
    pub fn bitwise(
        &mut self,
        operation: BitwiseOp,
        left: &Reg,
        left_size: u32,
        right: &Reg,
        right_size: u32,
    ) -> Reg {
        let opcode = match operation {
            BitwiseOp::And => "and",
            BitwiseOp::Or => "or",
        };
        self.binary(
            opcode,
            DataType::Integer,
            false,
            left,
            left_size,
            right,
            right_size,
        )
    }

    /// Converts an integer to a float, elementwise over arrays.
    pub fn int_to_float(&mut self, value: &Reg, array_size: u32) -> Reg {
        self.convert(value, array_size, DataType::Integer, DataType::Float, "sitofp")
    }

    /// Converts a float to an integer, elementwise over arrays.
    pub fn float_to_int(&mut self, value: &Reg, array_size: u32) -> Reg {
        self.convert(value, array_size, DataType::Float, DataType::Integer, "fptosi")
    }

    /// Widens a boolean to a 0/1 integer, elementwise over arrays.
    pub fn bool_to_int(&mut self, value: &Reg, array_size: u32) -> Reg {
        self.convert(value, array_size, DataType::Bool, DataType::Integer, "zext")
    }

    /// Narrows an integer to a boolean; any non-zero value is true.
    pub fn int_to_bool(&mut self, value: &Reg, array_size: u32) -> Reg {
        if array_size == 0 {
            let result = self.next_register();
            let buffer = self.buffer();
            writeln!(buffer, "\t{} = icmp ne i32 {}, 0", result, value).unwrap();
            return result;
        }
        let vector_type = Self::ir_type(DataType::Integer, array_size);
        let result_type = Self::ir_type(DataType::Bool, array_size);
        let mut accumulated = Reg("undef".to_string());
        for index in 0..array_size {
            let element = self.next_register();
            let flag = self.next_register();
            let inserted = self.next_register();
            let buffer = self.buffer();
            writeln!(
                buffer,
                "\t{} = extractvalue {} {}, {}",
                element, vector_type, value, index
            )
            .unwrap();
            writeln!(buffer, "\t{} = icmp ne i32 {}, 0", flag, element).unwrap();
            writeln!(
                buffer,
                "\t{} = insertvalue {} {}, i1 {}, {}",
                inserted, result_type, accumulated, flag, index
            )
            .unwrap();
            accumulated = inserted;
        }
        accumulated
    }

    /// Shared lowering for the `sitofp`/`fptosi`/`zext` conversion family.
    fn convert(
        &mut self,
        value: &Reg,
        array_size: u32,
        from: DataType,
        to: DataType,
        opcode: &str,
    ) -> Reg {
        let from_type = Self::ir_type(from, 0);
        let to_type = Self::ir_type(to, 0);
        if array_size == 0 {
            let result = self.next_register();
            let buffer = self.buffer();
            writeln!(
                buffer,
                "\t{} = {} {} {} to {}",
                result, opcode, from_type, value, to_type
            )
            .unwrap();
            return result;
        }
        let vector_type = Self::ir_type(from, array_size);
        let result_type = Self::ir_type(to, array_size);
        let mut accumulated = Reg("undef".to_string());
        for index in 0..array_size {
            let element = self.next_register();
            let converted = self.next_register();
            let inserted = self.next_register();
            let buffer = self.buffer();
            writeln!(
                buffer,
                "\t{} = extractvalue {} {}, {}",
                element, vector_type, value, index
            )
            .unwrap();
            writeln!(
                buffer,
                "\t{} = {} {} {} to {}",
                converted, opcode, from_type, element, to_type
            )
            .unwrap();
            writeln!(
                buffer,
                "\t{} = insertvalue {} {}, {} {}, {}",
                inserted, result_type, accumulated, to_type, converted, index
            )
            .unwrap();
            accumulated = inserted;
        }
        accumulated
    }

    /// Loads a variable's value, or one element of it when an index
    /// register is supplied.
    pub fn variable_reference(&mut self, symbol: &Symbol, index: Option<&Reg>) -> Reg {
        let slot = symbol.ir_name.as_deref().expect("variable has no slot");
        let full_type = Self::ir_type(symbol.data_type(), symbol.array_size());
        match index {
            None => {
                let result = self.next_register();
                let buffer = self.buffer();
                writeln!(buffer, "\t{} = load {}, {}* {}", result, full_type, full_type, slot)
                    .unwrap();
                result
            }
            Some(index) => {
                let element_type = Self::ir_type(symbol.data_type(), 0);
                let pointer = self.next_register();
                let result = self.next_register();
                let buffer = self.buffer();
                writeln!(
                    buffer,
                    "\t{} = getelementptr {}, {}* {}, i32 0, i32 {}",
                    pointer, full_type, full_type, slot, index
                )
                .unwrap();
                writeln!(
                    buffer,
                    "\t{} = load {}, {}* {}",
                    result, element_type, element_type, pointer
                )
                .unwrap();
                result
            }
        }
    }

    /// Stores a value into a variable, or into one element of it when an
    /// index register is supplied.
    pub fn assignment(&mut self, symbol: &Symbol, value: &Reg, index: Option<&Reg>) {
        let slot = symbol.ir_name.as_deref().expect("variable has no slot");
        let full_type = Self::ir_type(symbol.data_type(), symbol.array_size());
        match index {
            None => {
                let buffer = self.buffer();
                writeln!(buffer, "\tstore {} {}, {}* {}", full_type, value, full_type, slot)
                    .unwrap();
            }
            Some(index) => {
                let element_type = Self::ir_type(symbol.data_type(), 0);
                let pointer = self.next_register();
                let buffer = self.buffer();
                writeln!(
                    buffer,
                    "\t{} = getelementptr {}, {}* {}, i32 0, i32 {}",
                    pointer, full_type, full_type, slot, index
                )
                .unwrap();
                writeln!(
                    buffer,
                    "\tstore {} {}, {}* {}",
                    element_type, value, element_type, pointer
                )
                .unwrap();
            }
        }
    }

    /// Calls a procedure with the already-evaluated arguments, forwarded
    /// positionally.
    pub fn procedure_reference(
        &mut self,
        symbol: &Symbol,
        arguments: &[(Reg, DataType, u32)],
    ) -> Reg {
        let name = symbol.ir_name.as_deref().expect("procedure has no name");
        let return_type = Self::ir_type(symbol.data_type(), 0);
        let result = self.next_register();
        let mut call = format!("\t{} = call {} {}(", result, return_type, name);
        for (index, (value, data_type, array_size)) in arguments.iter().enumerate() {
            if index > 0 {
                call.push_str(", ");
            }
            write!(call, "{} {}", Self::ir_type(*data_type, *array_size), value).unwrap();
        }
        call.push_str(")\n");
        self.buffer().push_str(&call);
        result
    }

    /// Branches on the condition and returns the labels of the then-block
    /// and of the block control continues in when the condition is false.
    pub fn if_header(&mut self, condition: &Reg) -> (BlockLabel, BlockLabel) {
        let then_label = self.next_label("then");
        let next_label = self.next_label("else");
        let buffer = self.buffer();
        writeln!(
            buffer,
            "\tbr i1 {}, label %{}, label %{}",
            condition, then_label, next_label
        )
        .unwrap();
        (then_label, next_label)
    }

    /// Opens the basic block with the given label.
    pub fn basic_block(&mut self, label: &BlockLabel) {
        let buffer = self.buffer();
        writeln!(buffer, "{}:", label).unwrap();
    }

    /// Closes the then-branch and opens the else-branch. Returns the label
    /// both branches join at.
    pub fn if_else_transition(&mut self, next: &BlockLabel) -> BlockLabel {
        let end = self.next_label("end");
        let buffer = self.buffer();
        writeln!(buffer, "\tbr label %{}", end).unwrap();
        writeln!(buffer, "{}:", next).unwrap();
        end
    }

    /// Closes an if statement that had an else branch.
    pub fn if_else_end(&mut self, end: &BlockLabel) {
        let buffer = self.buffer();
        writeln!(buffer, "\tbr label %{}", end).unwrap();
        writeln!(buffer, "{}:", end).unwrap();
    }

    /// Closes an if statement without an else branch.
    pub fn if_end(&mut self, next: &BlockLabel) {
        let buffer = self.buffer();
        writeln!(buffer, "\tbr label %{}", next).unwrap();
        writeln!(buffer, "{}:", next).unwrap();
    }

    /// Opens the condition block of a loop. The initializer has already
    /// been emitted into the preceding block.
    pub fn for_begin(&mut self) -> BlockLabel {
        let condition = self.next_label("cond");
        let buffer = self.buffer();
        writeln!(buffer, "\tbr label %{}", condition).unwrap();
        writeln!(buffer, "{}:", condition).unwrap();
        condition
    }

    /// Branches into the loop body on the condition and returns the label
    /// of the block after the loop.
    pub fn for_body(&mut self, condition: &Reg) -> BlockLabel {
        let body = self.next_label("body");
        let end = self.next_label("endfor");
        let buffer = self.buffer();
        writeln!(
            buffer,
            "\tbr i1 {}, label %{}, label %{}",
            condition, body, end
        )
        .unwrap();
        writeln!(buffer, "{}:", body).unwrap();
        end
    }

    /// Closes the loop: jumps back to the condition block and opens the
    /// block after the loop.
    pub fn for_end(&mut self, condition: &BlockLabel, end: &BlockLabel) {
        let buffer = self.buffer();
        writeln!(buffer, "\tbr label %{}", condition).unwrap();
        writeln!(buffer, "{}:", end).unwrap();
    }

    /// Returns a scalar value from the current procedure.
    pub fn return_value(&mut self, value: &Reg, data_type: DataType) {
        let ir_type = Self::ir_type(data_type, 0);
        let buffer = self.buffer();
        writeln!(buffer, "\tret {} {}", ir_type, value).unwrap();
    }
}
