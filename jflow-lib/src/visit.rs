//! A visitor over the node vocabulary. Printers, checking policies, and
//! diagnostics implement [`NodeVisitor`] and override the kinds they care
//! about; everything else lands in `default_visit`. Each visit threads a
//! caller-supplied input value through the dispatch, which is how transfer
//! functions receive their pre-state. The [`visit`] dispatch is an
//! exhaustive match, so adding a node kind fails to compile until every
//! dispatch site handles it.

use crate::node::{Node, NodeId, NodeKind};

pub trait NodeVisitor<I> {
    type Output;

    /// Fallback for every kind without an override.
    fn default_visit(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output;

    fn visit_integer_literal(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_long_literal(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_boolean_literal(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_character_literal(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_string_literal(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_null_literal(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_numerical_minus(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_numerical_plus(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_bitwise_complement(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_conditional_not(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_numerical_addition(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_numerical_subtraction(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_numerical_multiplication(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_integer_division(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_integer_remainder(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_left_shift(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_signed_right_shift(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_unsigned_right_shift(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_bitwise_and(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_bitwise_or(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_bitwise_xor(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_equal_to(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_not_equal(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_less_than(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_less_than_or_equal(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_greater_than(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_greater_than_or_equal(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_string_concatenate(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_string_conversion(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_widening_conversion(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_narrowing_conversion(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_boxing(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_unboxing(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_local_variable(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_this_literal(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_field_access(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_array_access(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_assignment(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_variable_declaration(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_method_access(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_method_invocation(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_object_creation(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_array_creation(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_type_cast(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_instance_of(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_return(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_throw(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_case(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_marker(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }

    fn visit_lambda_result_expression(&mut self, id: NodeId, node: &Node, input: I) -> Self::Output {
        self.default_visit(id, node, input)
    }
}

/// Dispatch a node to the visitor method of its kind.
pub fn visit<I, V: NodeVisitor<I>>(visitor: &mut V, id: NodeId, node: &Node, input: I) -> V::Output {
    use NodeKind::*;
    match &node.kind {
        IntegerLiteral(_) => visitor.visit_integer_literal(id, node, input),
        LongLiteral(_) => visitor.visit_long_literal(id, node, input),
        BooleanLiteral(_) => visitor.visit_boolean_literal(id, node, input),
        CharacterLiteral(_) => visitor.visit_character_literal(id, node, input),
        StringLiteral(_) => visitor.visit_string_literal(id, node, input),
        NullLiteral => visitor.visit_null_literal(id, node, input),
        NumericalMinus { .. } => visitor.visit_numerical_minus(id, node, input),
        NumericalPlus { .. } => visitor.visit_numerical_plus(id, node, input),
        BitwiseComplement { .. } => visitor.visit_bitwise_complement(id, node, input),
        ConditionalNot { .. } => visitor.visit_conditional_not(id, node, input),
        NumericalAddition { .. } => visitor.visit_numerical_addition(id, node, input),
        NumericalSubtraction { .. } => visitor.visit_numerical_subtraction(id, node, input),
        NumericalMultiplication { .. } => visitor.visit_numerical_multiplication(id, node, input),
        IntegerDivision { .. } => visitor.visit_integer_division(id, node, input),
        IntegerRemainder { .. } => visitor.visit_integer_remainder(id, node, input),
        LeftShift { .. } => visitor.visit_left_shift(id, node, input),
        SignedRightShift { .. } => visitor.visit_signed_right_shift(id, node, input),
        UnsignedRightShift { .. } => visitor.visit_unsigned_right_shift(id, node, input),
        BitwiseAnd { .. } => visitor.visit_bitwise_and(id, node, input),
        BitwiseOr { .. } => visitor.visit_bitwise_or(id, node, input),
        BitwiseXor { .. } => visitor.visit_bitwise_xor(id, node, input),
        EqualTo { .. } => visitor.visit_equal_to(id, node, input),
        NotEqual { .. } => visitor.visit_not_equal(id, node, input),
        LessThan { .. } => visitor.visit_less_than(id, node, input),
        LessThanOrEqual { .. } => visitor.visit_less_than_or_equal(id, node, input),
        GreaterThan { .. } => visitor.visit_greater_than(id, node, input),
        GreaterThanOrEqual { .. } => visitor.visit_greater_than_or_equal(id, node, input),
        StringConcatenate { .. } => visitor.visit_string_concatenate(id, node, input),
        StringConversion { .. } => visitor.visit_string_conversion(id, node, input),
        WideningConversion { .. } => visitor.visit_widening_conversion(id, node, input),
        NarrowingConversion { .. } => visitor.visit_narrowing_conversion(id, node, input),
        Boxing { .. } => visitor.visit_boxing(id, node, input),
        Unboxing { .. } => visitor.visit_unboxing(id, node, input),
        LocalVariable(_) => visitor.visit_local_variable(id, node, input),
        ThisLiteral => visitor.visit_this_literal(id, node, input),
        FieldAccess { .. } => visitor.visit_field_access(id, node, input),
        ArrayAccess { .. } => visitor.visit_array_access(id, node, input),
        Assignment { .. } => visitor.visit_assignment(id, node, input),
        VariableDeclaration { .. } => visitor.visit_variable_declaration(id, node, input),
        MethodAccess { .. } => visitor.visit_method_access(id, node, input),
        MethodInvocation { .. } => visitor.visit_method_invocation(id, node, input),
        ObjectCreation { .. } => visitor.visit_object_creation(id, node, input),
        ArrayCreation { .. } => visitor.visit_array_creation(id, node, input),
        TypeCast { .. } => visitor.visit_type_cast(id, node, input),
        InstanceOf { .. } => visitor.visit_instance_of(id, node, input),
        Return(_) => visitor.visit_return(id, node, input),
        Throw(_) => visitor.visit_throw(id, node, input),
        Case { .. } => visitor.visit_case(id, node, input),
        Marker(_) => visitor.visit_marker(id, node, input),
        LambdaResultExpression { .. } => visitor.visit_lambda_result_expression(id, node, input),
    }
}
